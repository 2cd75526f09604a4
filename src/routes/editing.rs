// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Editing board routes for editors.

use crate::error::Result;
use crate::models::{EditStatus, EditTrack, Principal, Shoot};
use crate::routes::parse_filter;
use crate::services::views;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/editing", get(get_board))
        .route("/api/editing/{id}/status", post(change_edit_status))
        .route("/api/editing/{id}/payment", post(record_payment))
}

#[derive(Deserialize)]
struct BoardQuery {
    track: EditTrack,
    #[serde(default)]
    search: String,
    /// Editing status name, or "All"
    status: Option<String>,
}

/// One track's board, excluding records where the track is out of scope.
async fn get_board(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<Vec<Shoot>>> {
    principal.require_editor()?;
    let status = parse_filter::<EditStatus>(query.status.as_deref())?;

    let shoots = state.store.list_shoots().await?;
    Ok(Json(views::editing_board(
        &shoots,
        query.track,
        query.search.trim(),
        status,
    )))
}

#[derive(Deserialize)]
struct EditStatusRequest {
    track: EditTrack,
    status: EditStatus,
}

async fn change_edit_status(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(request): Json<EditStatusRequest>,
) -> Result<Json<Shoot>> {
    let shoot = state
        .shoots
        .change_edit_status(&principal, &id, request.track, request.status)
        .await?;
    Ok(Json(shoot))
}

#[derive(Deserialize)]
struct PaymentRequest {
    track: EditTrack,
    paid: bool,
}

async fn record_payment(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<Shoot>> {
    let shoot = state
        .shoots
        .record_payment(&principal, &id, request.track, request.paid)
        .await?;
    Ok(Json(shoot))
}
