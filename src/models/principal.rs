// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The authenticated caller.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::Shoot;

/// Privilege level carried in the session token's `role` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Worker,
    Editor,
    Admin,
}

/// Authenticated user extracted from the session token.
///
/// Passed explicitly into every query and view instead of being read from
/// ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
    pub display_name: String,
    /// Lowercased email
    pub email: String,
    pub role: Role,
}

impl Principal {
    /// True if the shoot's denormalized assignee is this principal.
    pub fn is_assignee_of(&self, shoot: &Shoot) -> bool {
        let by_name = shoot
            .worker_name
            .as_deref()
            .is_some_and(|name| !name.is_empty() && name == self.display_name);
        let by_email = shoot
            .assigned_to
            .as_deref()
            .is_some_and(|email| email.eq_ignore_ascii_case(&self.email));
        by_name || by_email
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        match self.role {
            Role::Admin => Ok(()),
            _ => Err(AppError::Forbidden("admin role required".to_string())),
        }
    }

    /// Editors and admins may work the editing board.
    pub fn require_editor(&self) -> Result<(), AppError> {
        match self.role {
            Role::Editor | Role::Admin => Ok(()),
            Role::Worker => Err(AppError::Forbidden("editor role required".to_string())),
        }
    }
}
