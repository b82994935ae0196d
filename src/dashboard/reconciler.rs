// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marker lifecycle reconciliation.
//!
//! Each snapshot is diffed against the markers already on the map:
//! - unseen vehicle: create a marker
//! - known vehicle: move it (always), restyle it (only if its projection
//!   changed), fly to it (only on a not-selected -> selected transition)
//! - vanished vehicle: remove the marker
//!
//! Moving a marker is cheap and happens every tick; restyling is not and
//! happens only on state transitions, so the poll rate does not drive
//! rendering cost.

use crate::dashboard::map::{CameraMove, MapSurface, MarkerHandle};
use crate::dashboard::marker::MarkerProjection;
use crate::models::Vehicle;
use std::collections::{HashMap, HashSet};

/// One rendered marker and the projection it was last drawn with.
#[derive(Debug, Clone, Copy)]
struct MarkerEntry {
    handle: MarkerHandle,
    projection: MarkerProjection,
}

/// What one reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileStats {
    pub created: usize,
    pub moved: usize,
    pub restyled: usize,
    pub removed: usize,
    /// Vehicle the camera was sent to, if any
    pub flown_to: Option<String>,
}

/// Owns the vehicle markers on a map surface.
#[derive(Debug)]
pub struct MarkerReconciler {
    markers: HashMap<String, MarkerEntry>,
    camera: CameraMove,
}

impl MarkerReconciler {
    pub fn new(camera: CameraMove) -> Self {
        Self {
            markers: HashMap::new(),
            camera,
        }
    }

    /// Number of vehicle markers currently on the map.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn contains(&self, vehicle_id: &str) -> bool {
        self.markers.contains_key(vehicle_id)
    }

    pub fn handle_of(&self, vehicle_id: &str) -> Option<MarkerHandle> {
        self.markers.get(vehicle_id).map(|e| e.handle)
    }

    pub fn projection_of(&self, vehicle_id: &str) -> Option<MarkerProjection> {
        self.markers.get(vehicle_id).map(|e| e.projection)
    }

    /// Bring the map in line with `snapshot`.
    ///
    /// Never fails. Duplicate vehicle IDs collapse onto one marker and the
    /// last occurrence wins.
    pub fn reconcile<S>(
        &mut self,
        snapshot: &[Vehicle],
        selected: Option<&str>,
        surface: &mut S,
    ) -> ReconcileStats
    where
        S: MapSurface + ?Sized,
    {
        let mut stats = ReconcileStats::default();

        for vehicle in snapshot {
            let projection = MarkerProjection::of(vehicle, selected);

            let was_selected = match self.markers.get_mut(&vehicle.id) {
                Some(entry) => {
                    surface.move_marker(entry.handle, vehicle.location);
                    stats.moved += 1;

                    let was_selected = entry.projection.is_selected;
                    if entry.projection != projection {
                        surface.restyle_marker(entry.handle, &projection.appearance());
                        entry.projection = projection;
                        stats.restyled += 1;
                    }
                    was_selected
                }
                None => {
                    let handle = surface.create_marker(vehicle.location, &projection.appearance());
                    self.markers
                        .insert(vehicle.id.clone(), MarkerEntry { handle, projection });
                    stats.created += 1;
                    false
                }
            };

            if projection.is_selected && !was_selected {
                surface.fly_to(vehicle.location, self.camera);
                stats.flown_to = Some(vehicle.id.clone());
            }
        }

        let present: HashSet<&str> = snapshot.iter().map(|v| v.id.as_str()).collect();
        self.markers.retain(|id, entry| {
            let keep = present.contains(id.as_str());
            if !keep {
                surface.remove_marker(entry.handle);
                stats.removed += 1;
            }
            keep
        });

        stats
    }

    /// Remove every vehicle marker, e.g. on logout.
    pub fn clear<S>(&mut self, surface: &mut S)
    where
        S: MapSurface + ?Sized,
    {
        for (_, entry) in self.markers.drain() {
            surface.remove_marker(entry.handle);
        }
    }
}
