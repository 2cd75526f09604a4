// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shoot Tracker: scheduling backend for a small video-production team.
//!
//! Workers accept, decline and complete the shoots they are assigned,
//! editors track post-production and payments, and admins manage the team
//! and export CSV reports. Shoots live in Firestore; this crate owns the
//! status rules, live views, exports and reminders.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::ShootStore;
use services::{MemberService, ReminderScheduler, ReportService, ShootFeed, ShootService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ShootStore>,
    pub feed: Arc<ShootFeed>,
    pub shoots: ShootService,
    pub members: MemberService,
    pub reports: ReportService,
}

impl AppState {
    /// Wire the services around one store and reminder scheduler.
    pub fn new(
        config: Config,
        store: Arc<dyn ShootStore>,
        reminders: Arc<dyn ReminderScheduler>,
    ) -> Self {
        let feed = Arc::new(ShootFeed::new(store.clone()));
        let shoots = ShootService::new(
            store.clone(),
            feed.clone(),
            reminders,
            config.team_utc_offset,
        );
        let members = MemberService::new(store.clone());
        let reports = ReportService::new(store.clone(), config.export_dir.clone());

        Self {
            config,
            store,
            feed,
            shoots,
            members,
            reports,
        }
    }
}
