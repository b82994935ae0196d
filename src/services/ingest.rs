// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Position ingestion service.
//!
//! Handles the tracker workflow:
//! 1. Validate and normalize the raw report
//! 2. Resolve the tracker ID to a vehicle
//! 3. Apply the position as a partial update
//!
//! Unknown trackers are dropped without a write. The caller still
//! acknowledges them so firmware does not retry forever.

use crate::db::VehicleStore;
use crate::error::{AppError, IngestError};
use crate::models::{CanonicalPosition, PositionReport, Vehicle};
use crate::services::normalize::Normalizer;
use std::sync::Arc;

/// What happened to a valid report.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// The vehicle bound to the tracker was updated.
    Updated(Box<Vehicle>),
    /// No vehicle carries this tracker ID; nothing was written.
    UnmatchedDevice,
}

/// Resolves tracker reports to vehicles and applies them.
#[derive(Clone)]
pub struct IngestService {
    store: Arc<dyn VehicleStore>,
    normalizer: Normalizer,
}

impl IngestService {
    pub fn new(store: Arc<dyn VehicleStore>, normalizer: Normalizer) -> Self {
        Self { store, normalizer }
    }

    /// Validate, normalize, and apply a raw report.
    pub async fn ingest(&self, report: &PositionReport) -> Result<UpsertOutcome, IngestError> {
        let normalized = self.normalizer.normalize(report).inspect_err(|e| {
            tracing::debug!(error = %e, "Rejected malformed position report");
        })?;

        self.upsert_position(&normalized.device_id, &normalized.position)
            .await
            .map_err(|e| IngestError::Storage {
                device_id: normalized.device_id.clone(),
                message: e.to_string(),
            })
    }

    /// Apply an already normalized position to the vehicle bound to `device_id`.
    pub async fn upsert_position(
        &self,
        device_id: &str,
        position: &CanonicalPosition,
    ) -> Result<UpsertOutcome, AppError> {
        let now = chrono::Utc::now();

        match self
            .store
            .apply_position_by_tracker(device_id, position, now)
            .await?
        {
            Some(vehicle) => {
                tracing::debug!(
                    device_id,
                    vehicle_id = %vehicle.id,
                    speed_kmh = position.speed_kmh,
                    status = ?position.motion_state,
                    "Position applied"
                );
                Ok(UpsertOutcome::Updated(Box::new(vehicle)))
            }
            None => {
                tracing::info!(device_id, "Ignoring report from unregistered tracker");
                Ok(UpsertOutcome::UnmatchedDevice)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{Geofence, LooseValue, Location, MotionState};

    fn store_with_tracker() -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::with_vehicles([Vehicle {
                id: "v1".to_string(),
                name: "Truck 1".to_string(),
                plate: String::new(),
                vehicle_type: "truck".to_string(),
                driver_id: None,
                status: MotionState::Stopped,
                is_locked: false,
                location: Location::default(),
                speed: 0,
                fuel_level: Some(73),
                tracker_id: Some("imei-1".to_string()),
                geofence: Geofence::default(),
                last_update: None,
            }])
            .unwrap(),
        )
    }

    fn report(id: &str, batt: Option<&str>) -> PositionReport {
        PositionReport {
            id: Some(LooseValue::Text(id.to_string())),
            deviceid: None,
            lat: Some(LooseValue::Text("48.85".to_string())),
            lon: Some(LooseValue::Text("2.35".to_string())),
            speed: Some(LooseValue::Text("5".to_string())),
            batt: batt.map(|b| LooseValue::Text(b.to_string())),
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_matched_report_updates_vehicle() {
        let store = store_with_tracker();
        let service = IngestService::new(store.clone(), Normalizer::default());

        let outcome = service.ingest(&report("imei-1", Some("41"))).await.unwrap();
        let UpsertOutcome::Updated(vehicle) = outcome else {
            panic!("expected update");
        };
        assert_eq!(vehicle.speed, 18);
        assert_eq!(vehicle.status, MotionState::Moving);
        assert_eq!(vehicle.fuel_level, Some(41));
        assert!(vehicle.last_update.is_some());
    }

    #[tokio::test]
    async fn test_absent_battery_preserves_fuel() {
        let store = store_with_tracker();
        let service = IngestService::new(store.clone(), Normalizer::default());

        service.ingest(&report("imei-1", None)).await.unwrap();

        let stored = store.get_vehicle("v1").await.unwrap().unwrap();
        assert_eq!(stored.fuel_level, Some(73));
        assert_eq!(stored.location.lat, 48.85);
    }

    #[tokio::test]
    async fn test_unmatched_device_writes_nothing() {
        let store = store_with_tracker();
        let before = store.list_vehicles().await.unwrap();
        let service = IngestService::new(store.clone(), Normalizer::default());

        let outcome = service.ingest(&report("stranger", Some("10"))).await.unwrap();

        assert_eq!(outcome, UpsertOutcome::UnmatchedDevice);
        assert_eq!(store.list_vehicles().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_malformed_report_writes_nothing() {
        let store = store_with_tracker();
        let before = store.list_vehicles().await.unwrap();
        let service = IngestService::new(store.clone(), Normalizer::default());

        let mut bad = report("imei-1", None);
        bad.lat = Some(LooseValue::Text("not-a-number".to_string()));

        let err = service.ingest(&bad).await.unwrap_err();
        assert!(matches!(err, IngestError::MalformedReport(_)));
        assert_eq!(store.list_vehicles().await.unwrap(), before);
    }
}
