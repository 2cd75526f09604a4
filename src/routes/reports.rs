// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CSV report downloads.

use crate::error::{AppError, Result};
use crate::models::Principal;
use crate::services::{DateRange, ExportedReport};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/reports/master", get(master_report))
        .route("/api/reports/me", get(personal_report))
        .route("/api/reports/member", get(member_history_report))
        .route("/api/reports/editing", get(editing_report))
}

#[derive(Deserialize)]
struct RangeQuery {
    start: String,
    end: String,
}

impl RangeQuery {
    fn range(&self) -> Result<DateRange> {
        DateRange::new(&self.start, &self.end)
    }
}

/// Send the exported file as an attachment.
async fn download(report: ExportedReport) -> Result<Response> {
    let body = report.read().await?;
    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        report.file_name.replace('"', ""),
        urlencoding::encode(&report.file_name)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

async fn master_report(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<RangeQuery>,
) -> Result<Response> {
    let report = state.reports.master(&principal, &query.range()?).await?;
    download(report).await
}

async fn personal_report(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<RangeQuery>,
) -> Result<Response> {
    let report = state.reports.personal(&principal, &query.range()?).await?;
    download(report).await
}

#[derive(Deserialize)]
struct MemberReportQuery {
    email: String,
    /// Both bounds or neither; neither exports the full history
    start: Option<String>,
    end: Option<String>,
}

async fn member_history_report(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<MemberReportQuery>,
) -> Result<Response> {
    let range = match (query.start.as_deref(), query.end.as_deref()) {
        (Some(start), Some(end)) => Some(DateRange::new(start, end)?),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "give both start and end, or neither for full history".to_string(),
            ))
        }
    };

    let report = state
        .reports
        .member_history(&principal, &query.email, range.as_ref())
        .await?;
    download(report).await
}

async fn editing_report(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Response> {
    let report = state.reports.editing(&principal).await?;
    download(report).await
}
