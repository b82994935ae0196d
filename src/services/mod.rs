// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod ingest;
pub mod normalize;

pub use ingest::{IngestService, UpsertOutcome};
pub use normalize::{MalformedReport, NormalizedReport, Normalizer};
