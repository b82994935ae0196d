// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vehicle model for storage and API.

use crate::models::position::CanonicalPosition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Default geofence radius for newly registered vehicles.
pub const DEFAULT_GEOFENCE_RADIUS_METERS: u32 = 500;

/// Whether a vehicle is currently moving, derived from its last reported speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum MotionState {
    #[serde(alias = "MOVING")]
    Moving,
    #[default]
    #[serde(alias = "STOPPED")]
    Stopped,
}

impl MotionState {
    /// Classify a speed. Moving iff strictly above the threshold.
    pub fn from_speed(speed_kmh: i64, threshold_kmh: i64) -> Self {
        if speed_kmh > threshold_kmh {
            MotionState::Moving
        } else {
            MotionState::Stopped
        }
    }
}

/// WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// Geofence configuration attached to a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Geofence {
    pub active: bool,
    #[validate(range(min = 10, max = 100_000))]
    pub radius_meters: u32,
}

impl Default for Geofence {
    fn default() -> Self {
        Self {
            active: false,
            radius_meters: DEFAULT_GEOFENCE_RADIUS_METERS,
        }
    }
}

/// Vehicle record stored in the fleet collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Internal primary key (also used as document ID)
    pub id: String,
    /// Display name
    pub name: String,
    /// License plate
    #[serde(default)]
    pub plate: String,
    /// Vehicle category (truck, van, car, ...)
    #[serde(default, rename = "type")]
    pub vehicle_type: String,
    /// Assigned driver, if any
    #[serde(default)]
    pub driver_id: Option<String>,
    /// Motion state from the last position report
    #[serde(default)]
    pub status: MotionState,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub location: Location,
    /// Speed in km/h from the last position report
    #[serde(default)]
    pub speed: i64,
    /// Fuel or battery level, 0-100
    #[serde(default)]
    pub fuel_level: Option<u8>,
    /// External tracker identifier (IMEI or app-generated)
    #[serde(default)]
    pub tracker_id: Option<String>,
    #[serde(default)]
    pub geofence: Geofence,
    /// When the last position report was applied
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub last_update: Option<DateTime<Utc>>,
}

impl Vehicle {
    /// Apply a normalized position report as a partial update.
    ///
    /// An absent fuel/battery reading leaves the stored level untouched.
    pub fn apply_position(&mut self, position: &CanonicalPosition, now: DateTime<Utc>) {
        self.location = Location {
            lat: position.lat,
            lng: position.lng,
        };
        self.speed = position.speed_kmh;
        self.status = position.motion_state;
        if let Some(level) = position.fuel_or_battery {
            self.fuel_level = Some(level);
        }
        self.last_update = Some(now);
    }
}

/// Vehicle create/update payload accepted by the fleet API.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    /// Existing vehicle ID; a new one is assigned when absent
    #[validate(length(min = 1, max = 64))]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub plate: String,
    #[serde(default, rename = "type")]
    #[validate(length(max = 40))]
    pub vehicle_type: String,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub tracker_id: Option<String>,
    #[serde(default)]
    pub is_locked: Option<bool>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    #[validate(range(max = 100))]
    pub fuel_level: Option<u8>,
    #[serde(default)]
    #[validate(nested)]
    pub geofence: Option<Geofence>,
}

impl VehicleInput {
    /// Merge this payload into an existing record (or a fresh one under `id`).
    ///
    /// Telemetry owned by ingestion (status, speed, last update) is carried
    /// over from the existing record.
    pub fn into_vehicle(self, id: String, existing: Option<Vehicle>) -> Vehicle {
        let base = existing.unwrap_or_else(|| Vehicle {
            id: id.clone(),
            name: String::new(),
            plate: String::new(),
            vehicle_type: String::new(),
            driver_id: None,
            status: MotionState::Stopped,
            is_locked: false,
            location: Location::default(),
            speed: 0,
            fuel_level: None,
            tracker_id: None,
            geofence: Geofence::default(),
            last_update: None,
        });

        Vehicle {
            id,
            name: self.name,
            plate: self.plate,
            vehicle_type: self.vehicle_type,
            driver_id: self.driver_id,
            is_locked: self.is_locked.unwrap_or(base.is_locked),
            location: self.location.unwrap_or(base.location),
            fuel_level: self.fuel_level.or(base.fuel_level),
            tracker_id: self.tracker_id,
            geofence: self.geofence.unwrap_or(base.geofence),
            ..base
        }
    }
}
