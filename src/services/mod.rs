// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod lifecycle;
pub mod live;
pub mod members;
pub mod reminder;
pub mod report;
pub mod views;

pub use lifecycle::{CreateShootRequest, ShootService, StatusChange};
pub use live::{ShootFeed, ShootQuery, Subscription};
pub use members::{MemberService, ProfileRequest};
pub use reminder::{LogReminderScheduler, Reminder, ReminderScheduler, TasksReminderScheduler};
pub use report::{DateRange, ExportedReport, ReportService};
