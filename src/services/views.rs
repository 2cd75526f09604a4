// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Derived projections over a snapshot of shoots.
//!
//! Every function takes the full current set and recomputes from scratch.
//! The caller's identity is always passed in explicitly.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{EditStatus, EditTrack, Member, Principal, Shoot, ShootStatus};
use crate::time_utils::parse_iso_date;

/// Marker color for a calendar day with a confirmed shoot.
pub const CONFIRMED_COLOR: &str = "#007AFF";
/// Marker color for any other status.
pub const OTHER_COLOR: &str = "#e67e22";

/// Calendar day marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarMark {
    pub status: ShootStatus,
    pub color: &'static str,
}

/// Map each date to a marker for the shoot seen last on that date.
///
/// Shoots sharing a date are not aggregated: the later one in `shoots`
/// overwrites the earlier.
pub fn calendar_marks(shoots: &[Shoot]) -> BTreeMap<String, CalendarMark> {
    let mut marks = BTreeMap::new();
    for shoot in shoots {
        let color = match shoot.status {
            ShootStatus::Accepted => CONFIRMED_COLOR,
            _ => OTHER_COLOR,
        };
        marks.insert(
            shoot.date.clone(),
            CalendarMark {
                status: shoot.status,
                color,
            },
        );
    }
    marks
}

/// True if the shoot is unassigned or assigned to `principal` by name or email.
pub fn visible_to(shoot: &Shoot, principal: &Principal) -> bool {
    shoot.is_unassigned() || principal.is_assignee_of(shoot)
}

/// Shoots in `month` (0-11) of `year` that the principal may see, oldest
/// first.
///
/// Dates are parsed and compared field by field; records whose date does
/// not parse are left out.
pub fn month_timeline(
    shoots: &[Shoot],
    principal: &Principal,
    month: u32,
    year: i32,
) -> Vec<Shoot> {
    let mut timeline: Vec<Shoot> = shoots
        .iter()
        .filter(|shoot| {
            parse_iso_date(&shoot.date)
                .is_some_and(|date| date.month0() == month && date.year() == year)
        })
        .filter(|shoot| visible_to(shoot, principal))
        .cloned()
        .collect();
    timeline.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    timeline
}

/// Worklist tabs, one per status, each newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Worklist {
    pub pending: Vec<Shoot>,
    pub accepted: Vec<Shoot>,
    pub declined: Vec<Shoot>,
    pub completed: Vec<Shoot>,
}

impl Worklist {
    pub fn tab(&self, status: ShootStatus) -> &[Shoot] {
        match status {
            ShootStatus::Pending => &self.pending,
            ShootStatus::Accepted => &self.accepted,
            ShootStatus::Declined => &self.declined,
            ShootStatus::Completed => &self.completed,
        }
    }
}

/// Partition shoots by exact status.
pub fn worklist(shoots: &[Shoot]) -> Worklist {
    let mut list = Worklist::default();
    for shoot in shoots {
        let tab = match shoot.status {
            ShootStatus::Pending => &mut list.pending,
            ShootStatus::Accepted => &mut list.accepted,
            ShootStatus::Declined => &mut list.declined,
            ShootStatus::Completed => &mut list.completed,
        };
        tab.push(shoot.clone());
    }
    for tab in [
        &mut list.pending,
        &mut list.accepted,
        &mut list.declined,
        &mut list.completed,
    ] {
        tab.sort_by(|a, b| b.date.cmp(&a.date));
    }
    list
}

/// Aggregate counters over the current set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatusCounts {
    pub total: u32,
    pub pending: u32,
    pub accepted: u32,
    pub declined: u32,
    pub completed: u32,
}

pub fn status_counts(shoots: &[Shoot]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for shoot in shoots {
        counts.total += 1;
        match shoot.status {
            ShootStatus::Pending => counts.pending += 1,
            ShootStatus::Accepted => counts.accepted += 1,
            ShootStatus::Declined => counts.declined += 1,
            ShootStatus::Completed => counts.completed += 1,
        }
    }
    counts
}

/// Admin list: title or location contains `search` (case-insensitive),
/// and status equals `status` unless it is `None` ("All").
pub fn admin_search(shoots: &[Shoot], search: &str, status: Option<ShootStatus>) -> Vec<Shoot> {
    let needle = search.to_lowercase();
    shoots
        .iter()
        .filter(|shoot| {
            shoot.name.to_lowercase().contains(&needle)
                || shoot.location.to_lowercase().contains(&needle)
        })
        .filter(|shoot| status.is_none_or(|wanted| shoot.status == wanted))
        .cloned()
        .collect()
}

/// Editing board for one track: records with the track in scope, matching
/// the client search and optional status filter.
pub fn editing_board(
    shoots: &[Shoot],
    track: EditTrack,
    search: &str,
    status: Option<EditStatus>,
) -> Vec<Shoot> {
    let needle = search.to_lowercase();
    shoots
        .iter()
        .filter(|shoot| shoot.edit_status(track) != Some(EditStatus::NotApplicable))
        .filter(|shoot| {
            shoot
                .client_name
                .as_deref()
                .unwrap_or("")
                .to_lowercase()
                .contains(&needle)
        })
        .filter(|shoot| status.is_none_or(|wanted| shoot.edit_status(track) == Some(wanted)))
        .cloned()
        .collect()
}

/// Typeahead suggestions: display name contains `term`, case-insensitive.
/// An empty term yields no suggestions.
pub fn assignee_suggestions<'a>(members: &'a [Member], term: &str) -> Vec<&'a Member> {
    if term.is_empty() {
        return Vec::new();
    }
    let needle = term.to_lowercase();
    members
        .iter()
        .filter(|member| member.display_name.to_lowercase().contains(&needle))
        .collect()
}

/// Admin team list: display name or email contains `search`.
pub fn member_search<'a>(members: &'a [Member], search: &str) -> Vec<&'a Member> {
    let needle = search.to_lowercase();
    members
        .iter()
        .filter(|member| {
            member.display_name.to_lowercase().contains(&needle)
                || member.email.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Everything the worker dashboard renders, recomputed per snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub counts: StatusCounts,
    pub worklist: Worklist,
    pub marks: BTreeMap<String, CalendarMark>,
}

pub fn dashboard(shoots: &[Shoot]) -> Dashboard {
    Dashboard {
        counts: status_counts(shoots),
        worklist: worklist(shoots),
        marks: calendar_marks(shoots),
    }
}
