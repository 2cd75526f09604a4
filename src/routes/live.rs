// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-Sent Events stream of the worker dashboard.

use crate::models::Principal;
use crate::services::views::dashboard;
use crate::services::{ShootQuery, Subscription};
use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Extension, Router,
};
use futures_util::stream::{self, Stream};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/me/live", get(live_dashboard))
}

/// Push the caller's dashboard now and again after every change.
///
/// The subscription is dropped when the client disconnects.
async fn live_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    tracing::debug!(uid = %principal.uid, "Live dashboard opened");
    let subscription = state
        .feed
        .subscribe(ShootQuery::AssignedTo(principal.email.clone()));

    Sse::new(dashboard_events(subscription)).keep_alive(KeepAlive::default())
}

fn dashboard_events(
    subscription: Subscription,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    stream::unfold((subscription, true), |(mut subscription, first)| async move {
        let shoots = if first {
            subscription.current()
        } else {
            subscription.next().await?
        };
        let event = Event::default()
            .event("dashboard")
            .json_data(dashboard(&shoots));
        Some((event, (subscription, false)))
    })
}
