// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process vehicle store.
//!
//! Rows live in a `DashMap` keyed by vehicle ID with a second `DashMap`
//! indexing tracker IDs. A position update holds the row's shard lock for
//! the whole read-modify-write, so concurrent reports for one tracker
//! serialize.

use crate::db::VehicleStore;
use crate::error::AppError;
use crate::models::{CanonicalPosition, Vehicle};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryStore {
    vehicles: DashMap<String, Vehicle>,
    /// tracker_id -> vehicle id
    trackers: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `vehicles`.
    pub fn with_vehicles(vehicles: impl IntoIterator<Item = Vehicle>) -> Result<Self, AppError> {
        let store = Self::new();
        for vehicle in vehicles {
            store.insert(vehicle)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    fn insert(&self, vehicle: Vehicle) -> Result<(), AppError> {
        if let Some(tracker) = &vehicle.tracker_id {
            match self.trackers.entry(tracker.clone()) {
                Entry::Occupied(bound) if bound.get() != &vehicle.id => {
                    return Err(AppError::Conflict(format!(
                        "Tracker {} is already assigned to vehicle {}",
                        tracker,
                        bound.get()
                    )));
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(vehicle.id.clone());
                }
            }
        }

        let id = vehicle.id.clone();
        let new_tracker = vehicle.tracker_id.clone();
        let previous = self.vehicles.insert(id.clone(), vehicle);

        // Release the old binding if the tracker was reassigned or removed.
        if let Some(old_tracker) = previous.and_then(|p| p.tracker_id) {
            if Some(&old_tracker) != new_tracker.as_ref() {
                self.trackers.remove_if(&old_tracker, |_, owner| owner == &id);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl VehicleStore for MemoryStore {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        let mut vehicles: Vec<Vehicle> = self.vehicles.iter().map(|e| e.value().clone()).collect();
        vehicles.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(vehicles)
    }

    async fn get_vehicle(&self, id: &str) -> Result<Option<Vehicle>, AppError> {
        Ok(self.vehicles.get(id).map(|v| v.value().clone()))
    }

    async fn upsert_vehicle(&self, vehicle: &Vehicle) -> Result<(), AppError> {
        self.insert(vehicle.clone())
    }

    async fn delete_vehicle(&self, id: &str) -> Result<bool, AppError> {
        match self.vehicles.remove(id) {
            Some((_, removed)) => {
                if let Some(tracker) = removed.tracker_id {
                    self.trackers.remove_if(&tracker, |_, owner| owner == id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn toggle_lock(&self, id: &str) -> Result<Option<Vehicle>, AppError> {
        Ok(self.vehicles.get_mut(id).map(|mut v| {
            v.is_locked = !v.is_locked;
            v.value().clone()
        }))
    }

    async fn apply_position_by_tracker(
        &self,
        tracker_id: &str,
        position: &CanonicalPosition,
        now: DateTime<Utc>,
    ) -> Result<Option<Vehicle>, AppError> {
        // Clone the ID out so the index guard is dropped before the row lock.
        let Some(vehicle_id) = self.trackers.get(tracker_id).map(|e| e.value().clone()) else {
            return Ok(None);
        };

        let Some(mut row) = self.vehicles.get_mut(&vehicle_id) else {
            return Ok(None);
        };

        // The binding may have moved between the index read and the row lock.
        if row.tracker_id.as_deref() != Some(tracker_id) {
            return Ok(None);
        }

        row.apply_position(position, now);
        Ok(Some(row.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Geofence, Location, MotionState};
    use std::sync::Arc;

    fn vehicle(id: &str, tracker: Option<&str>) -> Vehicle {
        Vehicle {
            id: id.to_string(),
            name: format!("Vehicle {}", id),
            plate: String::new(),
            vehicle_type: "truck".to_string(),
            driver_id: None,
            status: MotionState::Stopped,
            is_locked: false,
            location: Location::default(),
            speed: 0,
            fuel_level: Some(50),
            tracker_id: tracker.map(str::to_string),
            geofence: Geofence::default(),
            last_update: None,
        }
    }

    fn position(lat: f64) -> CanonicalPosition {
        CanonicalPosition {
            lat,
            lng: 1.0,
            speed_kmh: 10,
            motion_state: MotionState::Moving,
            fuel_or_battery: None,
        }
    }

    #[tokio::test]
    async fn test_tracker_conflict_rejected() {
        let store = MemoryStore::with_vehicles([vehicle("a", Some("t1"))]).unwrap();
        let err = store
            .upsert_vehicle(&vehicle("b", Some("t1")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_reassigned_tracker_releases_old_binding() {
        let store = MemoryStore::with_vehicles([vehicle("a", Some("t1"))]).unwrap();
        store
            .upsert_vehicle(&vehicle("a", Some("t2")))
            .await
            .unwrap();

        let now = Utc::now();
        assert!(store
            .apply_position_by_tracker("t1", &position(5.0), now)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .apply_position_by_tracker("t2", &position(5.0), now)
            .await
            .unwrap()
            .is_some());

        // t1 is free again
        store
            .upsert_vehicle(&vehicle("b", Some("t1")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_releases_tracker() {
        let store = MemoryStore::with_vehicles([vehicle("a", Some("t1"))]).unwrap();
        assert!(store.delete_vehicle("a").await.unwrap());
        assert!(!store.delete_vehicle("a").await.unwrap());
        assert!(store
            .apply_position_by_tracker("t1", &position(1.0), Utc::now())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_toggle_lock() {
        let store = MemoryStore::with_vehicles([vehicle("a", None)]).unwrap();
        assert!(store.toggle_lock("a").await.unwrap().unwrap().is_locked);
        assert!(!store.toggle_lock("a").await.unwrap().unwrap().is_locked);
        assert!(store.toggle_lock("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_reports_for_one_tracker() {
        let store = Arc::new(MemoryStore::with_vehicles([vehicle("a", Some("t1"))]).unwrap());

        let mut handles = vec![];
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .apply_position_by_tracker("t1", &position(i as f64), Utc::now())
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().unwrap().is_some());
        }

        let stored = store.get_vehicle("a").await.unwrap().unwrap();
        assert!((0.0..32.0).contains(&stored.location.lat));
        assert_eq!(stored.fuel_level, Some(50));
        assert_eq!(store.len(), 1);
    }
}
