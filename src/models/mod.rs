// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod position;
pub mod vehicle;

pub use position::{CanonicalPosition, LooseValue, PositionReport};
pub use vehicle::{Geofence, Location, MotionState, Vehicle, VehicleInput};
