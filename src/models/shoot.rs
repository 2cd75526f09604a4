// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shoot record, its lifecycle status and the editing sub-states.

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;


/// Lifecycle stage of a shoot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ShootStatus {
    Pending,
    Accepted,
    Declined,
    Completed,
}

impl ShootStatus {
    pub const ALL: [ShootStatus; 4] = [
        ShootStatus::Pending,
        ShootStatus::Accepted,
        ShootStatus::Declined,
        ShootStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShootStatus::Pending => "Pending",
            ShootStatus::Accepted => "Accepted",
            ShootStatus::Declined => "Declined",
            ShootStatus::Completed => "Completed",
        }
    }

    /// Validate a move to `to` requested by someone acting as `actor`.
    ///
    /// Workers answer and finish their own shoots; admins can close any open
    /// shoot and undo a completion. Asking for the current state is always
    /// accepted and reported as [`Transition::Unchanged`].
    pub fn transition(self, to: ShootStatus, actor: Actor) -> Result<Transition, TransitionError> {
        use ShootStatus::*;

        if self == to {
            return Ok(Transition::Unchanged);
        }

        let allowed = match actor {
            Actor::Assignee => matches!(
                (self, to),
                (Pending, Accepted) | (Pending, Declined) | (Accepted, Completed)
            ),
            Actor::Admin => matches!(
                (self, to),
                (Pending, Completed) | (Accepted, Completed) | (Completed, Accepted)
            ),
        };

        if allowed {
            Ok(Transition::Changed { from: self, to })
        } else {
            Err(TransitionError { from: self, to, actor })
        }
    }
}

impl std::str::FromStr for ShootStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShootStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown shoot status: {}", s))
    }
}

impl fmt::Display for ShootStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capacity in which a status change is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The worker the shoot is assigned to.
    Assignee,
    Admin,
}

/// Outcome of a validated status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed { from: ShootStatus, to: ShootStatus },
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move shoot from {from} to {to} as {actor:?}")]
pub struct TransitionError {
    pub from: ShootStatus,
    pub to: ShootStatus,
    pub actor: Actor,
}

/// Post-production stage of one editing deliverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum EditStatus {
    Pending,
    Done,
    Delivery,
    /// Deliverable is outside the record's scope.
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl EditStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EditStatus::Pending => "Pending",
            EditStatus::Done => "Done",
            EditStatus::Delivery => "Delivery",
            EditStatus::NotApplicable => "N/A",
        }
    }
}

impl std::str::FromStr for EditStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            EditStatus::Pending,
            EditStatus::Done,
            EditStatus::Delivery,
            EditStatus::NotApplicable,
        ]
        .into_iter()
        .find(|status| status.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown editing status: {}", s))
    }
}

impl fmt::Display for EditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which editing deliverable an editor is working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditTrack {
    Trailer,
    FullVideo,
}

/// Whether the record is a full shoot or post-production only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShootKind {
    Shoot,
    #[serde(rename = "Editing Only")]
    EditingOnly,
}

/// Deliverables ordered for a shoot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    Trailer,
    #[serde(rename = "Full Video")]
    FullVideo,
    Both,
}

impl Scope {
    pub fn includes(self, track: EditTrack) -> bool {
        matches!(
            (self, track),
            (Scope::Both, _)
                | (Scope::Trailer, EditTrack::Trailer)
                | (Scope::FullVideo, EditTrack::FullVideo)
        )
    }

    /// Initial editing status of `track` for this scope.
    pub fn initial_status(self, track: EditTrack) -> EditStatus {
        if self.includes(track) {
            EditStatus::Pending
        } else {
            EditStatus::NotApplicable
        }
    }
}

/// Shoot record stored in the shoots collection.
///
/// Field names match the documents written by the mobile app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shoot {
    /// Document ID, assigned by the store on insert. Read back from the
    /// document name that the Firestore client injects as `_firestore_id`.
    #[serde(default, rename(serialize = "id", deserialize = "_firestore_id"))]
    pub id: String,
    /// Shoot date (YYYY-MM-DD)
    pub date: String,
    /// Event title
    #[serde(default)]
    pub name: String,
    /// Client name (newer records use this instead of `name`)
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub location: String,
    /// Assignee email at the time of assignment
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Assignee display name at the time of assignment
    #[serde(default)]
    pub worker_name: Option<String>,
    pub status: ShootStatus,
    /// Creation timestamp (RFC 3339)
    #[serde(default)]
    pub created_at: String,

    // ─── Production / finance ────────────────────────────────────
    #[serde(default, rename = "type")]
    pub kind: Option<ShootKind>,
    #[serde(default)]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub trailer_status: Option<EditStatus>,
    #[serde(default)]
    pub full_video_status: Option<EditStatus>,
    #[serde(default)]
    pub trailer_budget: Option<String>,
    #[serde(default)]
    pub full_video_budget: Option<String>,
    #[serde(default)]
    pub trailer_paid: bool,
    #[serde(default)]
    pub full_video_paid: bool,
    #[serde(default)]
    pub trailer_paid_date: Option<String>,
    #[serde(default)]
    pub full_video_paid_date: Option<String>,
    #[serde(default)]
    pub trailer_done_date: Option<String>,
    #[serde(default)]
    pub full_video_done_date: Option<String>,
    #[serde(default)]
    pub trailer_delivery_date: Option<String>,
    #[serde(default)]
    pub full_video_delivery_date: Option<String>,
    #[serde(default, rename = "hardDiskID")]
    pub hard_disk_id: Option<String>,

    /// Bumped by the store on every write; used for conditional writes.
    #[serde(default)]
    pub revision: u64,
}

impl Shoot {
    /// Client name, falling back to the event title.
    pub fn display_name(&self) -> &str {
        match self.client_name.as_deref() {
            Some(client) if !client.is_empty() => client,
            _ => &self.name,
        }
    }

    /// Worker label for reports: display name, else email.
    pub fn worker_label(&self) -> &str {
        self.worker_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.assigned_to.as_deref())
            .unwrap_or("")
    }

    /// True if no worker is assigned.
    pub fn is_unassigned(&self) -> bool {
        self.worker_name.as_deref().map_or(true, str::is_empty)
    }

    pub fn edit_status(&self, track: EditTrack) -> Option<EditStatus> {
        match track {
            EditTrack::Trailer => self.trailer_status,
            EditTrack::FullVideo => self.full_video_status,
        }
    }

    /// Set the editing status of `track`, stamping the matching done/delivery date.
    pub fn set_edit_status(&mut self, track: EditTrack, status: EditStatus, today: &str) {
        let (slot, done, delivery) = match track {
            EditTrack::Trailer => (
                &mut self.trailer_status,
                &mut self.trailer_done_date,
                &mut self.trailer_delivery_date,
            ),
            EditTrack::FullVideo => (
                &mut self.full_video_status,
                &mut self.full_video_done_date,
                &mut self.full_video_delivery_date,
            ),
        };
        *slot = Some(status);
        match status {
            EditStatus::Done => *done = Some(today.to_string()),
            EditStatus::Delivery => *delivery = Some(today.to_string()),
            EditStatus::Pending | EditStatus::NotApplicable => {}
        }
    }

    pub fn is_paid(&self, track: EditTrack) -> bool {
        match track {
            EditTrack::Trailer => self.trailer_paid,
            EditTrack::FullVideo => self.full_video_paid,
        }
    }

    /// Record payment state of `track`. The paid date is cleared when unpaid.
    pub fn set_paid(&mut self, track: EditTrack, paid: bool, today: &str) {
        let (flag, date) = match track {
            EditTrack::Trailer => (&mut self.trailer_paid, &mut self.trailer_paid_date),
            EditTrack::FullVideo => (&mut self.full_video_paid, &mut self.full_video_paid_date),
        };
        *flag = paid;
        *date = paid.then(|| today.to_string());
    }
}

/// Fields of a shoot being created, before the store assigns an ID.
#[derive(Debug, Clone)]
pub struct NewShoot {
    pub date: String,
    pub name: String,
    pub client_name: Option<String>,
    pub location: String,
    pub assigned_to: String,
    pub worker_name: String,
    pub kind: Option<ShootKind>,
    pub scope: Option<Scope>,
    pub trailer_budget: Option<String>,
    pub full_video_budget: Option<String>,
    pub hard_disk_id: Option<String>,
    pub created_at: String,
}

impl NewShoot {
    /// Build the stored record with status `Pending`.
    pub fn into_shoot(self, id: String) -> Shoot {
        let (trailer_status, full_video_status) = match self.scope {
            Some(scope) => (
                Some(scope.initial_status(EditTrack::Trailer)),
                Some(scope.initial_status(EditTrack::FullVideo)),
            ),
            None => (None, None),
        };

        Shoot {
            id,
            date: self.date,
            name: self.name,
            client_name: self.client_name,
            location: self.location,
            assigned_to: Some(self.assigned_to),
            worker_name: Some(self.worker_name),
            status: ShootStatus::Pending,
            created_at: self.created_at,
            kind: self.kind,
            scope: self.scope,
            trailer_status,
            full_video_status,
            trailer_budget: self.trailer_budget,
            full_video_budget: self.full_video_budget,
            trailer_paid: false,
            full_video_paid: false,
            trailer_paid_date: None,
            full_video_paid_date: None,
            trailer_done_date: None,
            full_video_done_date: None,
            trailer_delivery_date: None,
            full_video_delivery_date: None,
            hard_disk_id: self.hard_disk_id,
            revision: 0,
        }
    }
}
