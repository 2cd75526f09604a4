// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Team member profiles and assignee lookup.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::db::ShootStore;
use crate::error::{AppError, Result};
use crate::models::member::normalize_email;
use crate::models::{Member, Principal, Shoot};
use crate::services::views::{assignee_suggestions, member_search};
use crate::time_utils::format_utc_rfc3339;

/// Profile fields a member may set on themselves.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[validate(length(min = 1, max = 80, message = "display name is required"))]
    pub display_name: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 120))]
    pub age: Option<u32>,
}

pub struct MemberService {
    store: Arc<dyn ShootStore>,
}

impl MemberService {
    pub fn new(store: Arc<dyn ShootStore>) -> Self {
        Self { store }
    }

    /// Members whose display name contains `term`, for the assignment picker.
    pub async fn suggest_assignees(&self, principal: &Principal, term: &str) -> Result<Vec<Member>> {
        principal.require_admin()?;
        let members = self.store.list_members().await?;
        Ok(assignee_suggestions(&members, term.trim())
            .into_iter()
            .cloned()
            .collect())
    }

    /// Admin team list filtered by name or email.
    pub async fn search(&self, principal: &Principal, search: &str) -> Result<Vec<Member>> {
        principal.require_admin()?;
        let members = self.store.list_members().await?;
        Ok(member_search(&members, search.trim())
            .into_iter()
            .cloned()
            .collect())
    }

    /// Create or update the caller's own profile.
    ///
    /// The email always comes from the session, normalized. The creation
    /// time of an existing profile is kept.
    pub async fn save_profile(
        &self,
        principal: &Principal,
        request: ProfileRequest,
    ) -> Result<Member> {
        request.validate()?;
        let display_name = request.display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(AppError::BadRequest("display name is required".to_string()));
        }

        let existing = self.store.get_member(&principal.uid).await?;
        let created_at = existing
            .as_ref()
            .map(|m| m.created_at.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| format_utc_rfc3339(Utc::now()));

        let member = Member {
            uid: principal.uid.clone(),
            display_name,
            email: normalize_email(&principal.email),
            created_at,
            age: request.age,
        };
        self.store.upsert_member(&member).await?;

        tracing::info!(
            uid = %member.uid,
            created = existing.is_none(),
            "Member profile saved"
        );
        Ok(member)
    }

    pub async fn profile(&self, principal: &Principal) -> Result<Member> {
        self.store
            .get_member(&principal.uid)
            .await?
            .ok_or_else(|| AppError::NotFound("profile not registered".to_string()))
    }

    /// Remove a member profile. Shoots keep their copied name and email.
    pub async fn delete_member(&self, principal: &Principal, uid: &str) -> Result<()> {
        principal.require_admin()?;
        if !self.store.delete_member(uid).await? {
            return Err(AppError::NotFound(format!("Member {} not found", uid)));
        }
        tracing::info!(uid, by = %principal.uid, "Member deleted");
        Ok(())
    }

    /// Every shoot ever assigned to `email`, newest first.
    pub async fn history(&self, principal: &Principal, email: &str) -> Result<Vec<Shoot>> {
        principal.require_admin()?;
        self.store
            .list_shoots_for_assignee(&normalize_email(email))
            .await
    }
}
