// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Headless map surface.
//!
//! Keeps marker state in memory, counts every operation, and logs it.
//! Backs the `fleet-watch` console and the reconciliation tests.

use crate::dashboard::map::{CameraMove, MapSurface, MarkerAppearance, MarkerHandle};
use crate::models::Location;
use std::collections::HashMap;

/// Operation counters since the surface was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceCounters {
    pub created: usize,
    pub moved: usize,
    pub restyled: usize,
    pub removed: usize,
    pub fly_tos: usize,
}

#[derive(Debug, Clone, Copy)]
struct HeadlessMarker {
    position: Location,
    appearance: MarkerAppearance,
    restyles: usize,
}

#[derive(Debug, Default)]
pub struct HeadlessSurface {
    next_handle: u64,
    markers: HashMap<MarkerHandle, HeadlessMarker>,
    counters: SurfaceCounters,
    last_fly_to: Option<(Location, CameraMove)>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self) -> SurfaceCounters {
        self.counters
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn position_of(&self, handle: MarkerHandle) -> Option<Location> {
        self.markers.get(&handle).map(|m| m.position)
    }

    pub fn appearance_of(&self, handle: MarkerHandle) -> Option<MarkerAppearance> {
        self.markers.get(&handle).map(|m| m.appearance)
    }

    /// How many times this marker has been restyled since creation.
    pub fn restyles_of(&self, handle: MarkerHandle) -> Option<usize> {
        self.markers.get(&handle).map(|m| m.restyles)
    }

    pub fn last_fly_to(&self) -> Option<(Location, CameraMove)> {
        self.last_fly_to
    }
}

impl MapSurface for HeadlessSurface {
    fn create_marker(&mut self, at: Location, appearance: &MarkerAppearance) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        self.markers.insert(
            handle,
            HeadlessMarker {
                position: at,
                appearance: *appearance,
                restyles: 0,
            },
        );
        self.counters.created += 1;
        tracing::debug!(marker = handle.0, lat = at.lat, lng = at.lng, color = ?appearance.color, "Marker created");
        handle
    }

    fn move_marker(&mut self, handle: MarkerHandle, to: Location) {
        if let Some(marker) = self.markers.get_mut(&handle) {
            marker.position = to;
            self.counters.moved += 1;
        }
    }

    fn restyle_marker(&mut self, handle: MarkerHandle, appearance: &MarkerAppearance) {
        if let Some(marker) = self.markers.get_mut(&handle) {
            marker.appearance = *appearance;
            marker.restyles += 1;
            self.counters.restyled += 1;
            tracing::debug!(marker = handle.0, color = ?appearance.color, glow = appearance.glow, "Marker restyled");
        }
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        if self.markers.remove(&handle).is_some() {
            self.counters.removed += 1;
            tracing::debug!(marker = handle.0, "Marker removed");
        }
    }

    fn fly_to(&mut self, target: Location, camera: CameraMove) {
        self.counters.fly_tos += 1;
        self.last_fly_to = Some((target, camera));
        tracing::info!(
            lat = target.lat,
            lng = target.lng,
            zoom = camera.zoom,
            duration_ms = camera.duration.as_millis() as u64,
            "Camera fly-to"
        );
    }
}
