// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Map rendering seam.
//!
//! The reconciler drives a [`MapSurface`]; a browser map, a native widget
//! or a test recorder can sit behind it.

use crate::models::Location;
use std::time::Duration;

/// Opaque handle to a marker created on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub u64);

/// Marker fill colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerColor {
    /// Vehicle reporting motion
    Moving,
    /// Vehicle standing still
    Stopped,
    /// Remotely locked vehicle
    Locked,
    /// The viewer's own position
    UserLocation,
}

/// Everything expensive about a marker: icon, glow, stacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerAppearance {
    pub color: MarkerColor,
    pub glow: bool,
    pub z_index: i32,
}

impl MarkerAppearance {
    pub fn user_location() -> Self {
        Self {
            color: MarkerColor::UserLocation,
            glow: false,
            z_index: Z_USER_LOCATION,
        }
    }
}

pub const Z_VEHICLE: i32 = 100;
pub const Z_SELECTED_VEHICLE: i32 = 1000;
pub const Z_USER_LOCATION: i32 = 500;

/// Camera animation parameters for a fly-to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMove {
    pub zoom: f64,
    pub duration: Duration,
}

/// A stateful map that markers are drawn onto.
///
/// `move_marker` must be cheap; `create_marker` and `restyle_marker` may
/// rebuild icons. `fly_to` starts an animation and returns immediately.
pub trait MapSurface {
    fn create_marker(&mut self, at: Location, appearance: &MarkerAppearance) -> MarkerHandle;

    fn move_marker(&mut self, handle: MarkerHandle, to: Location);

    fn restyle_marker(&mut self, handle: MarkerHandle, appearance: &MarkerAppearance);

    fn remove_marker(&mut self, handle: MarkerHandle);

    fn fly_to(&mut self, target: Location, camera: CameraMove);
}
