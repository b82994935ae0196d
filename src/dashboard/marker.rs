// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Visual marker state.

use crate::dashboard::map::{MarkerAppearance, MarkerColor, Z_SELECTED_VEHICLE, Z_VEHICLE};
use crate::models::{MotionState, Vehicle};

/// The vehicle fields that change how its marker looks.
///
/// Two equal projections render identically, so a marker is only
/// restyled when its projection changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerProjection {
    pub motion_state: MotionState,
    pub is_locked: bool,
    pub is_selected: bool,
}

impl MarkerProjection {
    pub fn of(vehicle: &Vehicle, selected: Option<&str>) -> Self {
        Self {
            motion_state: vehicle.status,
            is_locked: vehicle.is_locked,
            is_selected: selected == Some(vehicle.id.as_str()),
        }
    }

    /// Locked wins over motion for colour.
    pub fn appearance(&self) -> MarkerAppearance {
        let color = match (self.is_locked, self.motion_state) {
            (true, _) => MarkerColor::Locked,
            (false, MotionState::Moving) => MarkerColor::Moving,
            (false, MotionState::Stopped) => MarkerColor::Stopped,
        };

        MarkerAppearance {
            color,
            glow: self.is_selected,
            z_index: if self.is_selected {
                Z_SELECTED_VEHICLE
            } else {
                Z_VEHICLE
            },
        }
    }
}
