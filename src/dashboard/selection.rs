// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vehicle selection and the viewer's own location marker.

use crate::dashboard::map::{MapSurface, MarkerAppearance, MarkerHandle};
use crate::models::Location;

/// Tracks which vehicle is selected and owns the "my location" marker.
///
/// Selecting does not move the camera by itself; the reconciler flies to
/// the vehicle when it sees the selection transition. The location marker
/// lives outside the vehicle marker table, so snapshots never touch it.
#[derive(Debug, Default)]
pub struct SelectionController {
    selected: Option<String>,
    my_location: Option<MarkerHandle>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select a vehicle. Returns `true` if the selection changed.
    pub fn select(&mut self, vehicle_id: impl Into<String>) -> bool {
        let vehicle_id = vehicle_id.into();
        if self.selected.as_deref() == Some(vehicle_id.as_str()) {
            return false;
        }
        self.selected = Some(vehicle_id);
        true
    }

    /// Clear the selection. Returns `true` if something was selected.
    pub fn deselect(&mut self) -> bool {
        self.selected.take().is_some()
    }

    pub fn my_location(&self) -> Option<MarkerHandle> {
        self.my_location
    }

    /// Show the viewer's position, replacing any previous location marker.
    pub fn show_my_location<S>(&mut self, at: Location, surface: &mut S) -> MarkerHandle
    where
        S: MapSurface + ?Sized,
    {
        if let Some(previous) = self.my_location.take() {
            surface.remove_marker(previous);
        }
        let handle = surface.create_marker(at, &MarkerAppearance::user_location());
        self.my_location = Some(handle);
        handle
    }

    pub fn clear_my_location<S>(&mut self, surface: &mut S)
    where
        S: MapSurface + ?Sized,
    {
        if let Some(handle) = self.my_location.take() {
            surface.remove_marker(handle);
        }
    }
}
