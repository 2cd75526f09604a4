// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shoot lifecycle: creation, status changes, editing and payment updates.
//!
//! Every mutation reads the record, validates the requested change and
//! writes it back conditionally on the revision that was read, so two
//! concurrent writers cannot silently overwrite each other.

use std::sync::Arc;

use chrono::{FixedOffset, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use validator::{Validate, ValidationError};

use crate::db::ShootStore;
use crate::error::{AppError, Result};
use crate::models::member::normalize_email;
use crate::models::{
    Actor, EditStatus, EditTrack, NewShoot, Principal, Role, Scope, Shoot, ShootKind,
    ShootStatus, Transition, TransitionError,
};
use crate::services::live::ShootFeed;
use crate::services::reminder::{build_reminder, reminder_trigger, ReminderScheduler};
use crate::time_utils::{format_utc_rfc3339, parse_iso_date, today};

/// Per-principal submit locks.
///
/// A lock is held for exactly as long as the create call runs, success or
/// failure.
pub type SubmitLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

fn validate_iso_date(date: &str) -> std::result::Result<(), ValidationError> {
    match parse_iso_date(date) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("date").with_message("date must be YYYY-MM-DD".into())),
    }
}

fn validate_not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("required").with_message("field is required".into()))
    } else {
        Ok(())
    }
}

/// Admin request to schedule a new shoot.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateShootRequest {
    #[validate(custom(function = "validate_iso_date"))]
    pub date: String,
    /// Event title
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub location: String,
    /// Email of the member picked from the typeahead
    #[validate(email)]
    pub assignee_email: String,
    #[serde(default, rename = "type")]
    pub kind: Option<ShootKind>,
    #[serde(default)]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub trailer_budget: Option<String>,
    #[serde(default)]
    pub full_video_budget: Option<String>,
    #[serde(default, rename = "hardDiskID")]
    pub hard_disk_id: Option<String>,
}

/// Result of a status change request.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub shoot: Shoot,
    pub transition: Transition,
    /// Whether a reminder was handed to the scheduler.
    pub reminder_scheduled: bool,
}

/// Pick the capacity that allows `from -> to`.
///
/// An assignee answers their own shoot as a worker even when they are also an
/// admin; the admin table is used only when the worker table refuses.
fn resolve_transition(
    from: ShootStatus,
    to: ShootStatus,
    is_assignee: bool,
    is_admin: bool,
) -> std::result::Result<(Transition, Actor), TransitionError> {
    let as_assignee = is_assignee.then(|| from.transition(to, Actor::Assignee));
    match (as_assignee, is_admin) {
        (Some(Ok(transition)), _) => Ok((transition, Actor::Assignee)),
        (_, true) => from
            .transition(to, Actor::Admin)
            .map(|transition| (transition, Actor::Admin)),
        (Some(Err(e)), false) => Err(e),
        (None, false) => Err(TransitionError {
            from,
            to,
            actor: Actor::Assignee,
        }),
    }
}

/// Business operations on shoots.
pub struct ShootService {
    store: Arc<dyn ShootStore>,
    feed: Arc<ShootFeed>,
    reminders: Arc<dyn ReminderScheduler>,
    team_utc_offset: FixedOffset,
    submit_locks: SubmitLocks,
}

impl ShootService {
    pub fn new(
        store: Arc<dyn ShootStore>,
        feed: Arc<ShootFeed>,
        reminders: Arc<dyn ReminderScheduler>,
        team_utc_offset: FixedOffset,
    ) -> Self {
        Self {
            store,
            feed,
            reminders,
            team_utc_offset,
            submit_locks: Arc::new(DashMap::new()),
        }
    }

    fn today(&self) -> String {
        today(self.team_utc_offset, Utc::now())
    }

    /// Take the principal's submit lock, or fail if a submit is in flight.
    fn begin_submit(&self, principal: &Principal) -> Result<OwnedMutexGuard<()>> {
        let lock = self
            .submit_locks
            .entry(principal.uid.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        lock.try_lock_owned().map_err(|_| {
            tracing::info!(uid = %principal.uid, "Rejected duplicate shoot submission");
            AppError::Conflict("A shoot submission is already in progress".to_string())
        })
    }

    async fn load(&self, id: &str) -> Result<Shoot> {
        self.store
            .get_shoot(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shoot {} not found", id)))
    }

    /// Create a shoot assigned to an existing member.
    pub async fn create_shoot(
        &self,
        principal: &Principal,
        request: CreateShootRequest,
    ) -> Result<Shoot> {
        principal.require_admin()?;
        request.validate()?;

        let _submit = self.begin_submit(principal)?;

        let email = normalize_email(&request.assignee_email);
        let member = self
            .store
            .find_member_by_email(&email)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("No team member with email {}", email)))?;

        let new_shoot = NewShoot {
            date: request.date,
            name: request.name.trim().to_string(),
            client_name: request
                .client_name
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            location: request.location.trim().to_string(),
            assigned_to: member.email,
            worker_name: member.display_name,
            kind: request.kind,
            scope: request.scope,
            trailer_budget: request.trailer_budget,
            full_video_budget: request.full_video_budget,
            hard_disk_id: request.hard_disk_id,
            created_at: format_utc_rfc3339(Utc::now()),
        };

        let shoot = self.store.insert_shoot(new_shoot).await?;
        tracing::info!(
            shoot_id = %shoot.id,
            date = %shoot.date,
            worker = %shoot.worker_label(),
            created_by = %principal.uid,
            "Shoot created"
        );

        self.feed.refresh_after_write().await;
        Ok(shoot)
    }

    /// Move a shoot to `to`.
    ///
    /// If `expected` is given the change only applies while the shoot is
    /// still in that status. A worker accepting a shoot schedules its
    /// reminder.
    pub async fn change_status(
        &self,
        principal: &Principal,
        id: &str,
        to: ShootStatus,
        expected: Option<ShootStatus>,
    ) -> Result<StatusChange> {
        let shoot = self.load(id).await?;

        let is_assignee = principal.is_assignee_of(&shoot);
        let is_admin = principal.role == Role::Admin;
        if !is_assignee && !is_admin {
            return Err(AppError::Forbidden(
                "shoot is not assigned to you".to_string(),
            ));
        }

        if let Some(expected) = expected {
            if shoot.status != expected {
                return Err(AppError::Conflict(format!(
                    "Shoot is {} but {} was expected",
                    shoot.status, expected
                )));
            }
        }

        let (transition, actor) = resolve_transition(shoot.status, to, is_assignee, is_admin)
            .map_err(|e| {
                tracing::warn!(shoot_id = %id, error = %e, "Rejected status change");
                AppError::BadRequest(e.to_string())
            })?;

        let Transition::Changed { from, .. } = transition else {
            return Ok(StatusChange {
                shoot,
                transition,
                reminder_scheduled: false,
            });
        };

        let mut next = shoot;
        next.status = to;
        let stored = self.store.replace_shoot(&next).await?;
        tracing::info!(
            shoot_id = %stored.id,
            from = %from,
            to = %to,
            by = %principal.uid,
            "Shoot status changed"
        );

        let reminder_scheduled = if actor == Actor::Assignee && to == ShootStatus::Accepted {
            self.schedule_reminder(&stored).await
        } else {
            false
        };

        self.feed.refresh_after_write().await;
        Ok(StatusChange {
            shoot: stored,
            transition,
            reminder_scheduled,
        })
    }

    /// Hand the shoot's reminder to the scheduler if its trigger is still ahead.
    async fn schedule_reminder(&self, shoot: &Shoot) -> bool {
        let Some(trigger_at) = reminder_trigger(&shoot.date, self.team_utc_offset, Utc::now())
        else {
            tracing::debug!(shoot_id = %shoot.id, date = %shoot.date, "Reminder time already passed");
            return false;
        };

        let recipient = shoot.assigned_to.as_deref().unwrap_or_default();
        let reminder = build_reminder(
            &shoot.id,
            recipient,
            shoot.display_name(),
            &shoot.date,
            trigger_at,
        );

        // The status change is already committed; a failed reminder is logged only.
        match self.reminders.schedule(reminder).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(shoot_id = %shoot.id, error = %e, "Failed to schedule reminder");
                false
            }
        }
    }

    /// Set the editing status of one track.
    pub async fn change_edit_status(
        &self,
        principal: &Principal,
        id: &str,
        track: EditTrack,
        status: EditStatus,
    ) -> Result<Shoot> {
        principal.require_editor()?;

        if status == EditStatus::NotApplicable {
            return Err(AppError::BadRequest(
                "N/A is derived from the shoot scope and cannot be set".to_string(),
            ));
        }

        let mut shoot = self.load(id).await?;
        match shoot.edit_status(track) {
            Some(EditStatus::NotApplicable) => {
                return Err(AppError::BadRequest(format!(
                    "{:?} is not part of this shoot's scope",
                    track
                )));
            }
            Some(current) if current == status => return Ok(shoot),
            _ => {}
        }

        shoot.set_edit_status(track, status, &self.today());
        let stored = self.store.replace_shoot(&shoot).await?;
        tracing::info!(
            shoot_id = %stored.id,
            track = ?track,
            status = %status,
            by = %principal.uid,
            "Editing status changed"
        );

        self.feed.refresh_after_write().await;
        Ok(stored)
    }

    /// Mark one track paid or unpaid.
    pub async fn record_payment(
        &self,
        principal: &Principal,
        id: &str,
        track: EditTrack,
        paid: bool,
    ) -> Result<Shoot> {
        principal.require_editor()?;

        let mut shoot = self.load(id).await?;
        if shoot.is_paid(track) == paid {
            return Ok(shoot);
        }

        shoot.set_paid(track, paid, &self.today());
        let stored = self.store.replace_shoot(&shoot).await?;
        tracing::info!(
            shoot_id = %stored.id,
            track = ?track,
            paid,
            by = %principal.uid,
            "Payment recorded"
        );

        self.feed.refresh_after_write().await;
        Ok(stored)
    }

    /// Permanently delete a shoot.
    pub async fn delete_shoot(&self, principal: &Principal, id: &str) -> Result<()> {
        principal.require_admin()?;

        if !self.store.delete_shoot(id).await? {
            return Err(AppError::NotFound(format!("Shoot {} not found", id)));
        }
        tracing::info!(shoot_id = %id, by = %principal.uid, "Shoot deleted");

        self.feed.refresh_after_write().await;
        Ok(())
    }
}
