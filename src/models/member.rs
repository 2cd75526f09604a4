// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Team member profile stored in the users collection.

use serde::{Deserialize, Serialize};

/// Team member profile, keyed by auth `uid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Identity provider user ID (also used as document ID)
    pub uid: String,
    #[serde(default)]
    pub display_name: String,
    /// Login email, lowercased and trimmed
    #[serde(default)]
    pub email: String,
    /// When the profile was created (RFC 3339)
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub age: Option<u32>,
}

/// Normalize an email the way profiles store it.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
