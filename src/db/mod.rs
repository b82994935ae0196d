// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Handlers and services talk to a [`VehicleStore`] trait object so each
//! caller (server, tests, tools) can inject its own backend.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{CanonicalPosition, Vehicle};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Collection names as constants.
pub mod collections {
    pub const VEHICLES: &str = "vehicles";
}

/// Persistent vehicle storage.
///
/// Implementations must keep `tracker_id` unique across vehicles and apply
/// position updates for one tracker atomically (last write wins).
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// All vehicles, ordered by ID.
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError>;

    async fn get_vehicle(&self, id: &str) -> Result<Option<Vehicle>, AppError>;

    /// Create or replace a vehicle.
    ///
    /// Fails with [`AppError::Conflict`] if its tracker ID is bound to a
    /// different vehicle.
    async fn upsert_vehicle(&self, vehicle: &Vehicle) -> Result<(), AppError>;

    /// Delete a vehicle. Returns `false` if it did not exist.
    async fn delete_vehicle(&self, id: &str) -> Result<bool, AppError>;

    /// Flip the lock flag. Returns the updated vehicle, or `None` if unknown.
    async fn toggle_lock(&self, id: &str) -> Result<Option<Vehicle>, AppError>;

    /// Apply a position to the vehicle bound to `tracker_id`.
    ///
    /// Returns the updated vehicle, or `None` (and writes nothing) if no
    /// vehicle carries that tracker ID.
    async fn apply_position_by_tracker(
        &self,
        tracker_id: &str,
        position: &CanonicalPosition,
        now: DateTime<Utc>,
    ) -> Result<Option<Vehicle>, AppError>;
}
