// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Position reports as received from trackers, and their normalized form.

use crate::models::vehicle::MotionState;
use serde::Deserialize;

/// A loosely typed wire value.
///
/// Query strings and form bodies always carry text; JSON bodies from some
/// firmware send numbers. Both are accepted and coerced on demand.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    Number(f64),
    Text(String),
}

impl LooseValue {
    /// Numeric value, if the field is a finite number or a numeric string.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            LooseValue::Number(n) => *n,
            LooseValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Textual value. Integral numbers render without a fractional part.
    pub fn as_text(&self) -> String {
        match self {
            LooseValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            LooseValue::Number(n) => n.to_string(),
            LooseValue::Text(s) => s.trim().to_string(),
        }
    }
}

/// Position report in the OsmAnd/Traccar client format.
///
/// Every field is optional at this layer; `services::normalize` decides
/// what is required.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PositionReport {
    /// Tracker identifier
    #[serde(default)]
    pub id: Option<LooseValue>,
    /// Tracker identifier under the name some Traccar clients use
    #[serde(default)]
    pub deviceid: Option<LooseValue>,
    #[serde(default)]
    pub lat: Option<LooseValue>,
    #[serde(default)]
    pub lon: Option<LooseValue>,
    /// Speed in m/s
    #[serde(default)]
    pub speed: Option<LooseValue>,
    /// Battery level, 0-100
    #[serde(default)]
    pub batt: Option<LooseValue>,
    /// Device timestamp (unix seconds or ISO 8601); informational only
    #[serde(default)]
    pub timestamp: Option<LooseValue>,
}

impl PositionReport {
    /// The reported tracker identifier; `id` wins over `deviceid`.
    pub fn device_id(&self) -> Option<&LooseValue> {
        self.id.as_ref().or(self.deviceid.as_ref())
    }

    /// Overlay `other` on top of `self`: fields present in `other` win.
    pub fn merged_with(self, other: PositionReport) -> PositionReport {
        PositionReport {
            id: other.id.or(self.id),
            deviceid: other.deviceid.or(self.deviceid),
            lat: other.lat.or(self.lat),
            lon: other.lon.or(self.lon),
            speed: other.speed.or(self.speed),
            batt: other.batt.or(self.batt),
            timestamp: other.timestamp.or(self.timestamp),
        }
    }
}

/// Normalized, unit-consistent position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalPosition {
    pub lat: f64,
    pub lng: f64,
    /// Rounded, never negative
    pub speed_kmh: i64,
    pub motion_state: MotionState,
    /// 0-100 when the report carried a battery level
    pub fuel_or_battery: Option<u8>,
}
