// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Position report validation and unit normalization.
//!
//! Pure functions only: no storage, no clock, no network.

use crate::models::{CanonicalPosition, LooseValue, MotionState, PositionReport};

/// Reports at or below this speed are classified as stopped.
pub const DEFAULT_MOTION_THRESHOLD_KMH: i64 = 2;

/// m/s to km/h
const MPS_TO_KMH: f64 = 3.6;

/// A report that cannot be turned into a position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReport {
    #[error("missing required field '{0}'")]
    Missing(&'static str),

    #[error("field '{0}' is not numeric")]
    NotNumeric(&'static str),
}

/// A validated report: the tracker it came from and where it is.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedReport {
    pub device_id: String,
    pub position: CanonicalPosition,
}

/// Converts raw tracker reports into canonical positions.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    motion_threshold_kmh: i64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MOTION_THRESHOLD_KMH)
    }
}

impl Normalizer {
    pub fn new(motion_threshold_kmh: i64) -> Self {
        Self {
            motion_threshold_kmh,
        }
    }

    pub fn motion_threshold_kmh(&self) -> i64 {
        self.motion_threshold_kmh
    }

    /// Validate a report and convert it.
    ///
    /// Latitude and longitude are not range-checked; hardware in the field
    /// sends all sorts of things and the map copes.
    pub fn normalize(&self, report: &PositionReport) -> Result<NormalizedReport, MalformedReport> {
        let device_id = report
            .device_id()
            .map(LooseValue::as_text)
            .filter(|id| !id.is_empty())
            .ok_or(MalformedReport::Missing("id"))?;

        let lat = required_number(report.lat.as_ref(), "lat")?;
        let lng = required_number(report.lon.as_ref(), "lon")?;

        let speed_kmh = speed_kmh(report.speed.as_ref().and_then(LooseValue::as_f64));
        let fuel_or_battery = report
            .batt
            .as_ref()
            .and_then(LooseValue::as_f64)
            .map(battery_level);

        Ok(NormalizedReport {
            device_id,
            position: CanonicalPosition {
                lat,
                lng,
                speed_kmh,
                motion_state: MotionState::from_speed(speed_kmh, self.motion_threshold_kmh),
                fuel_or_battery,
            },
        })
    }
}

fn required_number(value: Option<&LooseValue>, field: &'static str) -> Result<f64, MalformedReport> {
    let value = value.ok_or(MalformedReport::Missing(field))?;
    if matches!(value, LooseValue::Text(s) if s.trim().is_empty()) {
        return Err(MalformedReport::Missing(field));
    }
    value.as_f64().ok_or(MalformedReport::NotNumeric(field))
}

/// Convert an m/s reading to rounded km/h. Absent means stationary.
pub fn speed_kmh(raw_mps: Option<f64>) -> i64 {
    let kmh = (raw_mps.unwrap_or(0.0) * MPS_TO_KMH).round();
    if kmh > 0.0 {
        kmh as i64
    } else {
        0
    }
}

/// Truncate a battery reading to a whole percentage.
pub fn battery_level(raw: f64) -> u8 {
    raw.floor().clamp(0.0, 100.0) as u8
}
