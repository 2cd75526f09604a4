// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live shoot feed.
//!
//! The feed keeps the latest full snapshot of the shoots collection in a
//! watch channel. It is refreshed after every write that goes through this
//! service and periodically by a poller, so writes made elsewhere show up
//! eventually. Subscribers get the whole matching set on every change.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::db::ShootStore;
use crate::error::Result;
use crate::models::{Principal, Shoot};
use crate::services::views::visible_to;

type Snapshot = Arc<Vec<Shoot>>;

/// Predicate a subscription filters the snapshot with.
#[derive(Debug, Clone)]
pub enum ShootQuery {
    All,
    /// `assignedTo` equals this email
    AssignedTo(String),
    /// `workerName` equals this display name
    WorkerName(String),
    /// Unassigned shoots plus the principal's own
    VisibleTo(Principal),
}

impl ShootQuery {
    fn matches(&self, shoot: &Shoot) -> bool {
        match self {
            ShootQuery::All => true,
            ShootQuery::AssignedTo(email) => shoot.assigned_to.as_deref() == Some(email.as_str()),
            ShootQuery::WorkerName(name) => shoot.worker_name.as_deref() == Some(name.as_str()),
            ShootQuery::VisibleTo(principal) => visible_to(shoot, principal),
        }
    }

    /// Matching shoots from a date-descending snapshot, order preserved.
    pub fn select(&self, snapshot: &[Shoot]) -> Vec<Shoot> {
        snapshot
            .iter()
            .filter(|shoot| self.matches(shoot))
            .cloned()
            .collect()
    }
}

/// Shared holder of the latest shoots snapshot.
pub struct ShootFeed {
    store: Arc<dyn ShootStore>,
    tx: watch::Sender<Snapshot>,
}

impl ShootFeed {
    /// Create an empty feed. Call [`ShootFeed::refresh`] to load it.
    pub fn new(store: Arc<dyn ShootStore>) -> Self {
        let (tx, _) = watch::channel(Arc::new(Vec::new()));
        Self { store, tx }
    }

    /// Re-read the collection and publish it if it changed.
    ///
    /// Returns whether subscribers were notified.
    pub async fn refresh(&self) -> Result<bool> {
        let shoots = self.store.list_shoots().await?;
        let changed = self.tx.send_if_modified(|current| {
            if current.as_slice() == shoots.as_slice() {
                false
            } else {
                *current = Arc::new(shoots);
                true
            }
        });
        if changed {
            tracing::debug!(count = self.tx.borrow().len(), "Shoot feed updated");
        }
        Ok(changed)
    }

    /// Refresh after a write, logging rather than failing the write.
    pub async fn refresh_after_write(&self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Shoot feed refresh failed after write");
        }
    }

    /// Latest full snapshot, newest first.
    pub fn snapshot(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    /// Open a subscription. It is torn down when dropped.
    pub fn subscribe(&self, query: ShootQuery) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            query,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Poll the store every `period` until the feed is dropped.
    pub fn spawn_poller(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        let feed = Arc::downgrade(&self);
        drop(self);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(feed) = feed.upgrade() else {
                    break;
                };
                if let Err(e) = feed.refresh().await {
                    tracing::warn!(error = %e, "Shoot feed poll failed");
                }
            }
            tracing::debug!("Shoot feed poller stopped");
        })
    }
}

/// A standing query over the feed.
pub struct Subscription {
    rx: watch::Receiver<Snapshot>,
    query: ShootQuery,
}

impl Subscription {
    /// Current matching set, marking it seen.
    pub fn current(&mut self) -> Vec<Shoot> {
        let snapshot = self.rx.borrow_and_update().clone();
        self.query.select(&snapshot)
    }

    /// Wait for the next change and return the full matching set.
    ///
    /// Returns `None` once the feed is gone.
    pub async fn next(&mut self) -> Option<Vec<Shoot>> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }
}
