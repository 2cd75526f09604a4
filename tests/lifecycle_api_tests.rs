// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shoot lifecycle through the HTTP API.
//!
//! Covers the worker flow Pending -> Accepted -> Completed, reminder
//! scheduling on acceptance, idempotent repeats and the status tabs.

use axum::http::StatusCode;
use chrono::{Datelike, Duration, NaiveTime, TimeZone, Utc};
use serde_json::json;
use shoot_tracker::db::ShootStore;
use shoot_tracker::models::{Role, ShootStatus};
use tower::ServiceExt;

mod common;
use common::{add_member, body_json, create_test_app, request, token_for, TestApp};

fn days_from_now(days: i64) -> String {
    let date = Utc::now().date_naive() + Duration::days(days);
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

async fn create_shoot(app: &TestApp, date: &str, name: &str, worker: &str) -> String {
    let admin = token_for("Admin", Role::Admin);
    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/api/shoots",
            &admin,
            Some(json!({
                "date": date,
                "name": name,
                "location": "Kandy",
                "assigneeEmail": format!("{}@example.com", worker.to_lowercase()),
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["workerName"], worker);
    body["id"].as_str().unwrap().to_string()
}

async fn set_status(
    app: &TestApp,
    token: &str,
    id: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/shoots/{}/status", id),
            token,
            Some(body),
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_accept_then_complete_schedules_one_reminder() {
    let app = create_test_app();
    add_member(&app.store, "Asha").await;
    let date = days_from_now(14);
    let id = create_shoot(&app, &date, "Perera Wedding", "Asha").await;
    let worker = token_for("Asha", Role::Worker);

    let (status, body) = set_status(&app, &worker, &id, json!({"status": "Accepted"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);
    assert_eq!(body["reminderScheduled"], true);

    let (_, body) = set_status(&app, &worker, &id, json!({"status": "Completed"})).await;
    assert_eq!(body["shoot"]["status"], "Completed");
    assert_eq!(body["reminderScheduled"], false);

    let stored = app.store.get_shoot(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, ShootStatus::Completed);

    let reminders = app.reminders.reminders.lock().unwrap();
    assert_eq!(reminders.len(), 1);

    let shoot_day = chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap();
    let expected = Utc.from_utc_datetime(
        &(shoot_day - Duration::days(1)).and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
    );
    assert_eq!(reminders[0].trigger_at, expected);
    assert_eq!(reminders[0].recipient, "asha@example.com");
}

#[tokio::test]
async fn test_repeated_transition_is_idempotent() {
    let app = create_test_app();
    add_member(&app.store, "Asha").await;
    let id = create_shoot(&app, &days_from_now(14), "Wedding", "Asha").await;
    let worker = token_for("Asha", Role::Worker);

    set_status(&app, &worker, &id, json!({"status": "Accepted"})).await;
    let (status, body) = set_status(&app, &worker, &id, json!({"status": "Accepted"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], false);

    set_status(&app, &worker, &id, json!({"status": "Completed"})).await;
    let before = app.store.get_shoot(&id).await.unwrap().unwrap();
    let (_, body) = set_status(&app, &worker, &id, json!({"status": "Completed"})).await;
    assert_eq!(body["changed"], false);

    let after = app.store.get_shoot(&id).await.unwrap().unwrap();
    assert_eq!(before, after);
    assert_eq!(app.reminders.count(), 1);
}

#[tokio::test]
async fn test_reminder_skipped_when_trigger_passed() {
    let app = create_test_app();
    add_member(&app.store, "Asha").await;
    let id = create_shoot(&app, &days_from_now(0), "Same day", "Asha").await;
    let worker = token_for("Asha", Role::Worker);

    let (status, body) = set_status(&app, &worker, &id, json!({"status": "Accepted"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shoot"]["status"], "Accepted");
    assert_eq!(body["reminderScheduled"], false);
    assert_eq!(app.reminders.count(), 0);
}

#[tokio::test]
async fn test_invalid_transitions_rejected() {
    let app = create_test_app();
    add_member(&app.store, "Asha").await;
    let id = create_shoot(&app, &days_from_now(14), "Wedding", "Asha").await;
    let worker = token_for("Asha", Role::Worker);

    let (status, _) = set_status(&app, &worker, &id, json!({"status": "Completed"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    set_status(&app, &worker, &id, json!({"status": "Declined"})).await;
    let (status, _) = set_status(&app, &worker, &id, json!({"status": "Accepted"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let nimal = token_for("Nimal", Role::Worker);
    let (status, _) = set_status(&app, &nimal, &id, json!({"status": "Declined"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expected_status_is_compare_and_swap() {
    let app = create_test_app();
    add_member(&app.store, "Asha").await;
    let id = create_shoot(&app, &days_from_now(14), "Wedding", "Asha").await;
    let worker = token_for("Asha", Role::Worker);
    let admin = token_for("Admin", Role::Admin);

    // Admin closes it while the worker still sees it as Pending
    let (status, _) = set_status(&app, &admin, &id, json!({"status": "Completed"})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = set_status(
        &app,
        &worker,
        &id,
        json!({"status": "Accepted", "expected": "Pending"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
    assert_eq!(app.reminders.count(), 0);
}

#[tokio::test]
async fn test_admin_undo_returns_to_accepted() {
    let app = create_test_app();
    add_member(&app.store, "Asha").await;
    let id = create_shoot(&app, &days_from_now(14), "Wedding", "Asha").await;
    let admin = token_for("Admin", Role::Admin);

    set_status(&app, &admin, &id, json!({"status": "Completed"})).await;
    let (status, body) = set_status(&app, &admin, &id, json!({"status": "Accepted"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shoot"]["status"], "Accepted");
    assert_eq!(app.reminders.count(), 0);
}

#[tokio::test]
async fn test_admin_assigned_to_own_shoot_can_accept() {
    let app = create_test_app();
    add_member(&app.store, "Rani").await;
    let id = create_shoot(&app, &days_from_now(14), "Launch", "Rani").await;
    let rani = token_for("Rani", Role::Admin);

    let (status, body) = set_status(&app, &rani, &id, json!({"status": "Accepted"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);
    assert_eq!(body["reminderScheduled"], true);
    assert_eq!(app.reminders.count(), 1);
    assert_eq!(app.reminders.reminders.lock().unwrap()[0].recipient, "rani@example.com");
}

#[tokio::test]
async fn test_march_scenario_tabs_and_timeline() {
    let app = create_test_app();
    add_member(&app.store, "Asha").await;
    let first = create_shoot(&app, "2026-03-10", "First", "Asha").await;
    let second = create_shoot(&app, "2026-03-15", "Second", "Asha").await;
    let worker = token_for("Asha", Role::Worker);

    for id in [&first, &second] {
        set_status(&app, &worker, id, json!({"status": "Accepted"})).await;
    }

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/me/timeline?month=2&year=2026", &worker, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let shoots = body["shoots"].as_array().unwrap();
    assert_eq!(shoots.len(), 2);
    assert_eq!(shoots[0]["id"], first.as_str());
    assert_eq!(shoots[1]["id"], second.as_str());
    assert_eq!(body["counts"]["accepted"], 2);

    set_status(&app, &worker, &first, json!({"status": "Completed"})).await;

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/me/dashboard", &worker, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let accepted = body["worklist"]["accepted"].as_array().unwrap();
    let completed = body["worklist"]["completed"].as_array().unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0]["id"], second.as_str());
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["id"], first.as_str());
    assert_eq!(body["marks"]["2026-03-10"]["status"], "Completed");
    assert_eq!(body["marks"]["2026-03-15"]["color"], "#007AFF");
}

#[tokio::test]
async fn test_admin_list_filters_and_delete() {
    let app = create_test_app();
    add_member(&app.store, "Asha").await;
    let keep = create_shoot(&app, "2026-03-10", "Galle Wedding", "Asha").await;
    let gone = create_shoot(&app, "2026-03-11", "Birthday", "Asha").await;
    let admin = token_for("Admin", Role::Admin);

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/shoots?search=galle&status=All", &admin, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], keep.as_str());

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/shoots?status=Accepted", &admin, None))
        .await
        .unwrap();
    assert!(body_json(response).await.as_array().unwrap().is_empty());

    let response = app
        .router
        .clone()
        .oneshot(request("DELETE", &format!("/api/shoots/{}", gone), &admin, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/shoots/stats", &admin, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["pending"], 1);
}
