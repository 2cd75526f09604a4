// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shoot routes for admins and workers.

use crate::error::{AppError, Result};
use crate::models::{Principal, Shoot, ShootStatus, Transition};
use crate::routes::parse_filter;
use crate::services::views::{self, Dashboard, StatusCounts};
use crate::services::CreateShootRequest;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/shoots", get(list_shoots).post(create_shoot))
        .route("/api/shoots/stats", get(get_stats))
        .route("/api/shoots/{id}", delete(delete_shoot))
        .route("/api/shoots/{id}/status", post(change_status))
        .route("/api/me/dashboard", get(get_dashboard))
        .route("/api/me/timeline", get(get_timeline))
}

// ─── Admin ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    search: String,
    /// Status name, or "All"
    status: Option<String>,
}

/// Admin list: every shoot, newest first, filtered by search and status.
async fn list_shoots(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Shoot>>> {
    principal.require_admin()?;
    let status = parse_filter::<ShootStatus>(query.status.as_deref())?;

    let shoots = state.store.list_shoots().await?;
    Ok(Json(views::admin_search(&shoots, query.search.trim(), status)))
}

async fn create_shoot(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateShootRequest>,
) -> Result<(StatusCode, Json<Shoot>)> {
    let shoot = state.shoots.create_shoot(&principal, request).await?;
    Ok((StatusCode::CREATED, Json(shoot)))
}

async fn delete_shoot(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.shoots.delete_shoot(&principal, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Team-wide counters.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<StatusCounts>> {
    principal.require_admin()?;
    let shoots = state.store.list_shoots().await?;
    Ok(Json(views::status_counts(&shoots)))
}

// ─── Status changes ──────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusChangeRequest {
    status: ShootStatus,
    /// Only apply if the shoot is still in this status
    #[serde(default)]
    expected: Option<ShootStatus>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub shoot: Shoot,
    pub changed: bool,
    pub reminder_scheduled: bool,
}

async fn change_status(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Json<StatusChangeResponse>> {
    let change = state
        .shoots
        .change_status(&principal, &id, request.status, request.expected)
        .await?;

    Ok(Json(StatusChangeResponse {
        changed: matches!(change.transition, Transition::Changed { .. }),
        reminder_scheduled: change.reminder_scheduled,
        shoot: change.shoot,
    }))
}

// ─── Worker views ────────────────────────────────────────────

/// The caller's own shoots: counters, status tabs and calendar marks.
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Dashboard>> {
    let shoots = state
        .store
        .list_shoots_for_assignee(&principal.email)
        .await?;
    Ok(Json(views::dashboard(&shoots)))
}

#[derive(Deserialize)]
struct TimelineQuery {
    /// Month index, 0 = January
    month: u32,
    year: i32,
}

/// Response for the month timeline.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TimelineResponse {
    pub month: u32,
    pub year: i32,
    pub counts: StatusCounts,
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub shoots: Vec<Shoot>,
}

/// Shoots in one month that are unassigned or assigned to the caller.
async fn get_timeline(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<TimelineResponse>> {
    if query.month > 11 {
        return Err(AppError::BadRequest("month must be 0-11".to_string()));
    }

    let shoots = state.store.list_shoots().await?;
    let shoots = views::month_timeline(&shoots, &principal, query.month, query.year);

    Ok(Json(TimelineResponse {
        month: query.month,
        year: query.year,
        counts: views::status_counts(&shoots),
        shoots,
    }))
}
