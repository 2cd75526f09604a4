// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Team member and profile routes.

use crate::error::Result;
use crate::models::{Member, Principal, Shoot};
use crate::services::ProfileRequest;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/members", get(list_members))
        .route("/api/members/suggest", get(suggest_members))
        .route("/api/members/history", get(member_history))
        .route("/api/members/{uid}", delete(delete_member))
        .route("/api/profile", get(get_profile).put(save_profile))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Admin team list, matched on name or email.
async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Member>>> {
    Ok(Json(state.members.search(&principal, &query.q).await?))
}

/// Assignment typeahead.
async fn suggest_members(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Member>>> {
    Ok(Json(
        state
            .members
            .suggest_assignees(&principal, &query.q)
            .await?,
    ))
}

#[derive(Deserialize)]
struct HistoryQuery {
    email: String,
}

async fn member_history(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Shoot>>> {
    Ok(Json(state.members.history(&principal, &query.email).await?))
}

async fn delete_member(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(uid): Path<String>,
) -> Result<StatusCode> {
    state.members.delete_member(&principal, &uid).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Member>> {
    Ok(Json(state.members.profile(&principal).await?))
}

/// Register or update the caller's profile.
async fn save_profile(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<Member>> {
    Ok(Json(state.members.save_profile(&principal, request).await?))
}
