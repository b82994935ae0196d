// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing [`VehicleStore`].
//!
//! Vehicles live in the `vehicles` collection keyed by vehicle ID. Tracker
//! lookups filter on the `trackerId` field, which Firestore indexes
//! automatically for single-field equality queries.

use crate::db::{collections, VehicleStore};
use crate::error::AppError;
use crate::models::{CanonicalPosition, Vehicle};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use firestore::{FirestoreConsistencySelector, FirestoreWritePrecondition};

/// Document fields written by a position update.
const POSITION_FIELDS: [&str; 4] = ["location", "speed", "status", "lastUpdate"];

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

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    async fn find_by_tracker(&self, tracker_id: &str) -> Result<Option<Vehicle>, AppError> {
        let tracker_id = tracker_id.to_string();
        let mut found: Vec<Vehicle> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::VEHICLES)
            .filter(move |q| q.for_all([q.field("trackerId").eq(tracker_id.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(found.pop())
    }
}

#[async_trait]
impl VehicleStore for FirestoreDb {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::VEHICLES)
            .order_by([("id", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_vehicle(&self, id: &str) -> Result<Option<Vehicle>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::VEHICLES)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_vehicle(&self, vehicle: &Vehicle) -> Result<(), AppError> {
        if let Some(tracker) = &vehicle.tracker_id {
            if let Some(owner) = self.find_by_tracker(tracker).await? {
                if owner.id != vehicle.id {
                    return Err(AppError::Conflict(format!(
                        "Tracker {} is already assigned to vehicle {}",
                        tracker, owner.id
                    )));
                }
            }
        }

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::VEHICLES)
            .document_id(&vehicle.id)
            .object(vehicle)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_vehicle(&self, id: &str) -> Result<bool, AppError> {
        if self.get_vehicle(id).await?.is_none() {
            return Ok(false);
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::VEHICLES)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(true)
    }

    /// Flip the lock flag in a read-write transaction; two concurrent
    /// toggles cannot both commit from the same read.
    async fn toggle_lock(&self, id: &str) -> Result<Option<Vehicle>, AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Read through the transaction so a concurrent toggle aborts this
        // commit instead of being overwritten.
        let current: Option<Vehicle> = client
            .clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ))
            .fluent()
            .select()
            .by_id_in(collections::VEHICLES)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(mut vehicle) = current else {
            let _ = transaction.rollback().await;
            return Ok(None);
        };
        vehicle.is_locked = !vehicle.is_locked;

        client
            .fluent()
            .update()
            .fields(["isLocked"])
            .in_col(collections::VEHICLES)
            .document_id(id)
            .object(&vehicle)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add lock update to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(Some(vehicle))
    }

    /// Single-document field-masked write: only the position fields (and
    /// the fuel level when reported) are touched, and the `exists`
    /// precondition stops a concurrently deleted vehicle from being
    /// resurrected as a partial document.
    async fn apply_position_by_tracker(
        &self,
        tracker_id: &str,
        position: &CanonicalPosition,
        now: DateTime<Utc>,
    ) -> Result<Option<Vehicle>, AppError> {
        let Some(mut vehicle) = self.find_by_tracker(tracker_id).await? else {
            return Ok(None);
        };
        vehicle.apply_position(position, now);

        let mut fields: Vec<&str> = POSITION_FIELDS.to_vec();
        if position.fuel_or_battery.is_some() {
            fields.push("fuelLevel");
        }

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields)
            .in_col(collections::VEHICLES)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(&vehicle.id)
            .object(&vehicle)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Some(vehicle))
    }
}
