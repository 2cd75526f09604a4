// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store with the same semantics as the Firestore collections.

use crate::db::{sort_newest_first, ShootStore};
use crate::error::AppError;
use crate::models::{Member, NewShoot, Shoot};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Shoots and members held in concurrent maps. Cloning shares the data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    shoots: Arc<DashMap<String, Shoot>>,
    members: Arc<DashMap<String, Member>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_shoots<F>(&self, predicate: F) -> Vec<Shoot>
    where
        F: Fn(&Shoot) -> bool,
    {
        let mut shoots: Vec<Shoot> = self
            .shoots
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        sort_newest_first(&mut shoots);
        shoots
    }
}

#[async_trait]
impl ShootStore for MemoryStore {
    async fn list_shoots(&self) -> Result<Vec<Shoot>, AppError> {
        Ok(self.collect_shoots(|_| true))
    }

    async fn list_shoots_for_assignee(&self, email: &str) -> Result<Vec<Shoot>, AppError> {
        Ok(self.collect_shoots(|s| s.assigned_to.as_deref() == Some(email)))
    }

    async fn list_shoots_for_worker(&self, display_name: &str) -> Result<Vec<Shoot>, AppError> {
        Ok(self.collect_shoots(|s| s.worker_name.as_deref() == Some(display_name)))
    }

    async fn list_shoots_in_range(&self, start: &str, end: &str) -> Result<Vec<Shoot>, AppError> {
        let mut shoots =
            self.collect_shoots(|s| s.date.as_str() >= start && s.date.as_str() <= end);
        shoots.reverse();
        Ok(shoots)
    }

    async fn get_shoot(&self, id: &str) -> Result<Option<Shoot>, AppError> {
        Ok(self.shoots.get(id).map(|entry| entry.value().clone()))
    }

    async fn insert_shoot(&self, shoot: NewShoot) -> Result<Shoot, AppError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let shoot = shoot.into_shoot(id);
        self.shoots.insert(shoot.id.clone(), shoot.clone());
        Ok(shoot)
    }

    async fn replace_shoot(&self, shoot: &Shoot) -> Result<Shoot, AppError> {
        let mut entry = self
            .shoots
            .get_mut(&shoot.id)
            .ok_or_else(|| AppError::NotFound(format!("Shoot {} not found", shoot.id)))?;

        if entry.revision != shoot.revision {
            return Err(AppError::Conflict(format!(
                "Shoot {} was modified by someone else",
                shoot.id
            )));
        }

        let mut next = shoot.clone();
        next.revision += 1;
        *entry = next.clone();
        Ok(next)
    }

    async fn delete_shoot(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.shoots.remove(id).is_some())
    }

    async fn list_members(&self) -> Result<Vec<Member>, AppError> {
        let mut members: Vec<Member> = self
            .members
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        members.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(members)
    }

    async fn get_member(&self, uid: &str) -> Result<Option<Member>, AppError> {
        Ok(self.members.get(uid).map(|entry| entry.value().clone()))
    }

    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>, AppError> {
        Ok(self
            .members
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn upsert_member(&self, member: &Member) -> Result<(), AppError> {
        self.members.insert(member.uid.clone(), member.clone());
        Ok(())
    }

    async fn delete_member(&self, uid: &str) -> Result<bool, AppError> {
        Ok(self.members.remove(uid).is_some())
    }
}
