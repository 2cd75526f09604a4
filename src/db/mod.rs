// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore, with an in-memory store for local runs).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Member, NewShoot, Shoot};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const SHOOTS: &str = "shoots";
    /// Member profiles (keyed by uid)
    pub const USERS: &str = "users";
}

/// Typed operations on the shoots and members collections.
///
/// Shoot listings are ordered by `date` descending unless noted.
#[async_trait]
pub trait ShootStore: Send + Sync {
    async fn list_shoots(&self) -> Result<Vec<Shoot>, AppError>;

    /// Shoots whose `assignedTo` equals `email`.
    async fn list_shoots_for_assignee(&self, email: &str) -> Result<Vec<Shoot>, AppError>;

    /// Shoots whose `workerName` equals `display_name`.
    async fn list_shoots_for_worker(&self, display_name: &str) -> Result<Vec<Shoot>, AppError>;

    /// Shoots with `start <= date <= end`, ordered by `date` ascending.
    async fn list_shoots_in_range(&self, start: &str, end: &str) -> Result<Vec<Shoot>, AppError>;

    async fn get_shoot(&self, id: &str) -> Result<Option<Shoot>, AppError>;

    /// Store a new shoot under a freshly assigned document ID.
    async fn insert_shoot(&self, shoot: NewShoot) -> Result<Shoot, AppError>;

    /// Overwrite a shoot if its stored revision still equals `shoot.revision`.
    ///
    /// Returns the stored record with the bumped revision, or
    /// [`AppError::Conflict`] if someone else wrote in between.
    async fn replace_shoot(&self, shoot: &Shoot) -> Result<Shoot, AppError>;

    /// Permanently delete a shoot. Returns `false` if it did not exist.
    async fn delete_shoot(&self, id: &str) -> Result<bool, AppError>;

    /// All members ordered by display name ascending.
    async fn list_members(&self) -> Result<Vec<Member>, AppError>;

    async fn get_member(&self, uid: &str) -> Result<Option<Member>, AppError>;

    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>, AppError>;

    async fn upsert_member(&self, member: &Member) -> Result<(), AppError>;

    /// Delete a member profile. Shoot history referencing it is kept.
    async fn delete_member(&self, uid: &str) -> Result<bool, AppError>;
}

/// Order shoots newest first, breaking date ties by ID so listings are stable.
pub(crate) fn sort_newest_first(shoots: &mut [Shoot]) {
    shoots.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
}
