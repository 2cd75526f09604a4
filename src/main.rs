// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shoot Tracker API Server
//!
//! Serves the worker, editor and admin screens of the shoot scheduling app.

use shoot_tracker::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemoryStore, ShootStore},
    services::{LogReminderScheduler, ReminderScheduler, TasksReminderScheduler},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Shoot Tracker API");

    let store: Arc<dyn ShootStore> = match config.store {
        StoreBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let reminders: Arc<dyn ReminderScheduler> = match &config.reminder_webhook_url {
        Some(url) => {
            tracing::info!(
                project = %config.gcp_project_id,
                gateway = %url,
                "Reminders delivered through Cloud Tasks"
            );
            Arc::new(TasksReminderScheduler::new(
                &config.gcp_project_id,
                &config.gcp_region,
                url,
            ))
        }
        None => {
            tracing::info!("REMINDER_WEBHOOK_URL not set; reminders are only logged");
            Arc::new(LogReminderScheduler)
        }
    };

    let state = Arc::new(AppState::new(config.clone(), store, reminders));

    // Load the live feed before serving, then keep it fresh
    if let Err(e) = state.feed.refresh().await {
        tracing::warn!(error = %e, "Initial shoot feed load failed");
    }
    let _poller = state.feed.clone().spawn_poller(config.feed_refresh);

    // Build router
    let app = shoot_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shoot_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .try_init()?;
    Ok(())
}
