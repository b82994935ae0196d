// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fleet-Tracker: live vehicle positions for the fleet dashboard
//!
//! This crate provides the tracker ingestion endpoint and fleet API, and
//! the headless core of the dashboard map: snapshot polling, marker
//! reconciliation and selection handling.

pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::VehicleStore;
use services::{IngestService, Normalizer};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn VehicleStore>,
    pub ingest_service: IngestService,
}

impl AppState {
    /// Wire services over the given store.
    pub fn new(config: Config, store: Arc<dyn VehicleStore>) -> Self {
        let ingest_service = IngestService::new(
            store.clone(),
            Normalizer::new(config.motion_threshold_kmh),
        );
        Self {
            config,
            store,
            ingest_service,
        }
    }
}
