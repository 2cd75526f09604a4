// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shoot reminders.
//!
//! Accepting a shoot schedules one notification for the day before the shoot
//! at 09:00 team time. Delivery is fire-and-forget: a Cloud Task posts the
//! reminder to the notification gateway when it comes due.

use crate::error::{AppError, Result};
use crate::time_utils::parse_iso_date;
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Local time of day at which reminders fire.
const REMINDER_HOUR: u32 = 9;

/// A notification to deliver at an absolute time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub shoot_id: String,
    /// Recipient email
    pub recipient: String,
    pub title: String,
    pub body: String,
    pub trigger_at: DateTime<Utc>,
}

/// When the reminder for a shoot on `date` should fire.
///
/// Returns `None` if the date does not parse or the trigger time is not
/// strictly after `now`.
pub fn reminder_trigger(
    date: &str,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let shoot_day = parse_iso_date(date)?;
    let day_before = shoot_day - Duration::days(1);
    let local = day_before.and_time(NaiveTime::from_hms_opt(REMINDER_HOUR, 0, 0)?);
    let trigger = offset
        .from_local_datetime(&local)
        .single()?
        .with_timezone(&Utc);

    (trigger > now).then_some(trigger)
}

/// Build the reminder text for a shoot.
pub fn build_reminder(
    shoot_id: &str,
    recipient: &str,
    client: &str,
    date: &str,
    trigger_at: DateTime<Utc>,
) -> Reminder {
    Reminder {
        shoot_id: shoot_id.to_string(),
        recipient: recipient.to_string(),
        title: "Shoot tomorrow".to_string(),
        body: format!("Reminder: {} is scheduled for {}.", client, date),
        trigger_at,
    }
}

/// Sink for scheduled notifications.
#[async_trait]
pub trait ReminderScheduler: Send + Sync {
    async fn schedule(&self, reminder: Reminder) -> Result<()>;
}

/// Logs reminders instead of delivering them (no gateway configured).
#[derive(Debug, Default)]
pub struct LogReminderScheduler;

#[async_trait]
impl ReminderScheduler for LogReminderScheduler {
    async fn schedule(&self, reminder: Reminder) -> Result<()> {
        tracing::info!(
            shoot_id = %reminder.shoot_id,
            recipient = %reminder.recipient,
            trigger_at = %reminder.trigger_at,
            "Reminder scheduled (no gateway configured, not delivered)"
        );
        Ok(())
    }
}

/// Cloud Tasks client that posts reminders to the notification gateway at
/// their trigger time.
pub struct TasksReminderScheduler {
    project_id: String,
    location: String,
    queue_name: String,
    gateway_url: String,
}

impl TasksReminderScheduler {
    pub fn new(project_id: &str, region: &str, gateway_url: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            location: region.to_string(),
            queue_name: crate::config::REMINDER_QUEUE_NAME.to_string(),
            gateway_url: gateway_url.to_string(),
        }
    }
}

#[async_trait]
impl ReminderScheduler for TasksReminderScheduler {
    async fn schedule(&self, reminder: Reminder) -> Result<()> {
        use google_cloud_tasks_v2::client::CloudTasks;
        use google_cloud_tasks_v2::model::{HttpRequest, OidcToken, Task};

        let client = CloudTasks::builder()
            .build()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Cloud Tasks client error: {}", e)))?;

        let queue_path = format!(
            "projects/{}/locations/{}/queues/{}",
            self.project_id, self.location, self.queue_name
        );

        let body = serde_json::to_vec(&reminder)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JSON error: {}", e)))?;

        let http_request = HttpRequest::default()
            .set_url(self.gateway_url.clone())
            .set_http_method("POST")
            .set_body(axum::body::Bytes::from(body))
            .set_headers(std::collections::HashMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]))
            .set_oidc_token(
                OidcToken::default()
                    .set_service_account_email(format!(
                        "shoot-tracker-api@{}.iam.gserviceaccount.com",
                        self.project_id
                    ))
                    .set_audience(self.gateway_url.clone()),
            );

        let schedule_time = google_cloud_wkt::Timestamp::clamp(
            reminder.trigger_at.timestamp(),
            reminder.trigger_at.timestamp_subsec_nanos() as i32,
        );

        let task = Task::default()
            .set_http_request(http_request)
            .set_schedule_time(schedule_time);

        client
            .create_task()
            .set_parent(queue_path)
            .set_task(task)
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Cloud Tasks create error: {}", e)))?;

        tracing::info!(
            shoot_id = %reminder.shoot_id,
            trigger_at = %reminder.trigger_at,
            "Queued shoot reminder"
        );
        Ok(())
    }
}
