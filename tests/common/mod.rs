// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use shoot_tracker::config::Config;
use shoot_tracker::db::{FirestoreDb, MemoryStore, ShootStore};
use shoot_tracker::middleware::auth::create_jwt;
use shoot_tracker::models::{Member, Role};
use shoot_tracker::services::{Reminder, ReminderScheduler};
use shoot_tracker::AppState;
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Scheduler that records reminders instead of delivering them.
#[derive(Default)]
pub struct RecordingScheduler {
    pub reminders: Mutex<Vec<Reminder>>,
}

#[allow(dead_code)]
impl RecordingScheduler {
    pub fn count(&self) -> usize {
        self.reminders.lock().unwrap().len()
    }
}

#[async_trait]
impl ReminderScheduler for RecordingScheduler {
    async fn schedule(&self, reminder: Reminder) -> shoot_tracker::error::Result<()> {
        self.reminders.lock().unwrap().push(reminder);
        Ok(())
    }
}

/// Everything a test needs to drive the router.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub reminders: Arc<RecordingScheduler>,
    pub export_dir: tempfile::TempDir,
}

/// Create a test app over an in-memory store.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let export_dir = tempfile::tempdir().expect("temp dir");
    let mut config = Config::test_default();
    config.export_dir = export_dir.path().to_path_buf();

    let store = Arc::new(MemoryStore::new());
    let reminders = Arc::new(RecordingScheduler::default());
    let state = Arc::new(AppState::new(config, store.clone(), reminders.clone()));

    TestApp {
        router: shoot_tracker::routes::create_router(state.clone()),
        state,
        store,
        reminders,
        export_dir,
    }
}

/// Create an app whose store is offline, so every query fails.
#[allow(dead_code)]
pub fn create_offline_app() -> axum::Router {
    let config = Config::test_default();
    let state = Arc::new(AppState::new(
        config,
        Arc::new(FirestoreDb::new_mock()),
        Arc::new(RecordingScheduler::default()),
    ));
    shoot_tracker::routes::create_router(state)
}

/// Session token for a test user; email is `<name>@example.com` lowercased.
#[allow(dead_code)]
pub fn token_for(name: &str, role: Role) -> String {
    let key = Config::test_default().jwt_signing_key;
    create_jwt(
        &format!("uid-{}", name.to_lowercase()),
        name,
        &format!("{}@example.com", name.to_lowercase()),
        role,
        &key,
    )
    .unwrap()
}

/// Register a member profile directly in the store.
#[allow(dead_code)]
pub async fn add_member(store: &MemoryStore, name: &str) {
    store
        .upsert_member(&Member {
            uid: format!("uid-{}", name.to_lowercase()),
            display_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            age: None,
        })
        .await
        .unwrap();
}

/// Build an authenticated request with an optional JSON body.
#[allow(dead_code)]
pub fn request(method: &str, uri: &str, token: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Collect a response body.
#[allow(dead_code)]
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
