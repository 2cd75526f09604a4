// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Shoots (the scheduling records shared by all screens)
//! - Users (member profiles used for assignment and reports)

use crate::db::{collections, ShootStore};
use crate::error::AppError;
use crate::models::{Member, NewShoot, Shoot};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::{FirestoreConsistencySelector, FirestoreQueryDirection};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Query shoots with a single equality filter, newest first.
    async fn query_shoots_where(&self, field: &str, value: &str) -> Result<Vec<Shoot>, AppError> {
        let field = field.to_string();
        let value = value.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SHOOTS)
            .filter(move |q| q.for_all([q.field(field.as_str()).eq(value.clone())]))
            .order_by([("date", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn write_shoot(&self, shoot: &Shoot) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SHOOTS)
            .document_id(&shoot.id)
            .object(shoot)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ShootStore for FirestoreDb {
    // ─── Shoot Operations ────────────────────────────────────────

    async fn list_shoots(&self) -> Result<Vec<Shoot>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SHOOTS)
            .order_by([("date", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_shoots_for_assignee(&self, email: &str) -> Result<Vec<Shoot>, AppError> {
        self.query_shoots_where("assignedTo", email).await
    }

    async fn list_shoots_for_worker(&self, display_name: &str) -> Result<Vec<Shoot>, AppError> {
        self.query_shoots_where("workerName", display_name).await
    }

    async fn list_shoots_in_range(&self, start: &str, end: &str) -> Result<Vec<Shoot>, AppError> {
        let start = start.to_string();
        let end = end.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SHOOTS)
            .filter(move |q| {
                q.for_all([
                    q.field("date").greater_than_or_equal(start.clone()),
                    q.field("date").less_than_or_equal(end.clone()),
                ])
            })
            .order_by([("date", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_shoot(&self, id: &str) -> Result<Option<Shoot>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SHOOTS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn insert_shoot(&self, shoot: NewShoot) -> Result<Shoot, AppError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let shoot = shoot.into_shoot(id);
        self.write_shoot(&shoot).await?;
        tracing::debug!(shoot_id = %shoot.id, date = %shoot.date, "Inserted shoot");
        Ok(shoot)
    }

    async fn replace_shoot(&self, shoot: &Shoot) -> Result<Shoot, AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Read through the transaction so a concurrent commit aborts one of us
        let tx_client = client.clone_with_consistency_selector(
            FirestoreConsistencySelector::Transaction(transaction.transaction_id().clone()),
        );
        let current: Option<Shoot> = tx_client
            .fluent()
            .select()
            .by_id_in(collections::SHOOTS)
            .obj()
            .one(&shoot.id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read shoot in transaction: {}", e))
            })?;

        let current = match current {
            Some(current) => current,
            None => {
                let _ = transaction.rollback().await;
                return Err(AppError::NotFound(format!("Shoot {} not found", shoot.id)));
            }
        };

        if current.revision != shoot.revision {
            tracing::warn!(
                shoot_id = %shoot.id,
                expected = shoot.revision,
                actual = current.revision,
                "Stale write rejected"
            );
            let _ = transaction.rollback().await;
            return Err(stale_write(&shoot.id));
        }

        let mut next = shoot.clone();
        next.revision += 1;

        client
            .fluent()
            .update()
            .in_col(collections::SHOOTS)
            .document_id(&next.id)
            .object(&next)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add shoot to transaction: {}", e))
            })?;

        transaction.commit().await.map_err(|e| match e {
            FirestoreError::DataConflictError(_) => stale_write(&shoot.id),
            FirestoreError::DatabaseError(ref db_err) if db_err.retry_possible => {
                tracing::warn!(shoot_id = %shoot.id, error = %e, "Contended write aborted");
                stale_write(&shoot.id)
            }
            other => AppError::Database(format!("Transaction commit failed: {}", other)),
        })?;

        Ok(next)
    }

    async fn delete_shoot(&self, id: &str) -> Result<bool, AppError> {
        if self.get_shoot(id).await?.is_none() {
            return Ok(false);
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::SHOOTS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(true)
    }

    // ─── Member Operations ───────────────────────────────────────

    async fn list_members(&self) -> Result<Vec<Member>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([("displayName", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_member(&self, uid: &str) -> Result<Option<Member>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>, AppError> {
        let email = email.to_string();
        let members: Vec<Member> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("email").eq(email.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(members.into_iter().next())
    }

    async fn upsert_member(&self, member: &Member) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&member.uid)
            .object(member)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_member(&self, uid: &str) -> Result<bool, AppError> {
        if self.get_member(uid).await?.is_none() {
            return Ok(false);
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(uid)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(uid, "Deleted member profile; shoot history retained");
        Ok(true)
    }
}

fn stale_write(id: &str) -> AppError {
    AppError::Conflict(format!("Shoot {} was modified by someone else", id))
}
