// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Headless dashboard core: snapshot polling and live map reconciliation.

pub mod map;
pub mod marker;
pub mod poller;
pub mod reconciler;
pub mod selection;
pub mod session;
pub mod surface;

pub use map::{CameraMove, MapSurface, MarkerAppearance, MarkerColor, MarkerHandle};
pub use marker::MarkerProjection;
pub use poller::{
    HttpSnapshotSource, PollError, PollSummary, PollerHandle, SnapshotPoller, SnapshotSource,
};
pub use reconciler::{MarkerReconciler, ReconcileStats};
pub use selection::SelectionController;
pub use session::{Dashboard, DashboardCommand};
pub use surface::{HeadlessSurface, SurfaceCounters};
