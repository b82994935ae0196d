// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fleet_tracker::config::Config;
use fleet_tracker::db::{FirestoreDb, MemoryStore};
use fleet_tracker::middleware::auth::create_jwt;
use fleet_tracker::models::{Geofence, Location, MotionState, Vehicle};
use fleet_tracker::routes::create_router;
use fleet_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// A stored vehicle with a known tracker.
#[allow(dead_code)]
pub fn test_vehicle(id: &str, tracker: Option<&str>) -> Vehicle {
    Vehicle {
        id: id.to_string(),
        name: format!("Vehicle {}", id),
        plate: "TEST-1".to_string(),
        vehicle_type: "truck".to_string(),
        driver_id: None,
        status: MotionState::Stopped,
        is_locked: false,
        location: Location {
            lat: 40.0,
            lng: -74.0,
        },
        speed: 0,
        fuel_level: Some(80),
        tracker_id: tracker.map(str::to_string),
        geofence: Geofence::default(),
        last_update: None,
    }
}

/// Create a test app over an in-memory store seeded with two vehicles:
/// `v1` (tracker `imei-1`) and `v2` (tracker `imei-2`).
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(
        MemoryStore::with_vehicles([
            test_vehicle("v1", Some("imei-1")),
            test_vehicle("v2", Some("imei-2")),
        ])
        .expect("Failed to seed store"),
    );
    let state = Arc::new(AppState::new(Config::test_default(), store.clone()));

    (create_router(state.clone()), state, store)
}

/// Session token accepted by the test app.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    create_jwt(user_id, signing_key).expect("Failed to create JWT")
}

/// Read a response body as UTF-8 text.
#[allow(dead_code)]
pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
