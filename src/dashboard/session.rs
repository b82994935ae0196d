// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard map state: the latest snapshot plus everything drawn from it.

use crate::dashboard::map::{CameraMove, MapSurface};
use crate::dashboard::reconciler::{MarkerReconciler, ReconcileStats};
use crate::dashboard::selection::SelectionController;
use crate::models::{Location, Vehicle};

/// User actions delivered to a running dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardCommand {
    Select(String),
    Deselect,
    /// Show the viewer's position (from browser/OS geolocation)
    LocateMe(Location),
}

/// Client-side dashboard state bound to one map surface.
///
/// Not shared: a single task owns it, so each snapshot is fully reconciled
/// before the next one is accepted.
pub struct Dashboard<S: MapSurface> {
    vehicles: Vec<Vehicle>,
    reconciler: MarkerReconciler,
    selection: SelectionController,
    surface: S,
}

impl<S: MapSurface> Dashboard<S> {
    pub fn new(surface: S, camera: CameraMove) -> Self {
        Self {
            vehicles: Vec::new(),
            reconciler: MarkerReconciler::new(camera),
            selection: SelectionController::new(),
            surface,
        }
    }

    /// Replace the vehicle collection wholesale and redraw.
    pub fn apply_snapshot(&mut self, snapshot: Vec<Vehicle>) -> ReconcileStats {
        self.vehicles = snapshot;
        self.redraw()
    }

    /// Apply a user action. Selection changes redraw immediately from the
    /// current snapshot rather than waiting for the next poll.
    pub fn handle(&mut self, command: DashboardCommand) -> Option<ReconcileStats> {
        match command {
            DashboardCommand::Select(id) => self.selection.select(id).then(|| self.redraw()),
            DashboardCommand::Deselect => self.selection.deselect().then(|| self.redraw()),
            DashboardCommand::LocateMe(at) => {
                self.selection.show_my_location(at, &mut self.surface);
                None
            }
        }
    }

    fn redraw(&mut self) -> ReconcileStats {
        let stats = self.reconciler.reconcile(
            &self.vehicles,
            self.selection.selected(),
            &mut self.surface,
        );
        tracing::debug!(
            vehicles = self.vehicles.len(),
            created = stats.created,
            moved = stats.moved,
            restyled = stats.restyled,
            removed = stats.removed,
            flown_to = ?stats.flown_to,
            "Map reconciled"
        );
        stats
    }

    /// Tear down all markers, including the location marker.
    pub fn clear(&mut self) {
        self.reconciler.clear(&mut self.surface);
        self.selection.clear_my_location(&mut self.surface);
        self.vehicles.clear();
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn selected(&self) -> Option<&str> {
        self.selection.selected()
    }

    pub fn reconciler(&self) -> &MarkerReconciler {
        &self.reconciler
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
