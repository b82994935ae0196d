// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fleet API routes for authenticated dashboard users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Vehicle, VehicleInput};
use crate::AppState;
use axum::{
    extract::State,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Fleet routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/vehicles", get(list_vehicles).post(mutate_vehicle))
}

/// Full fleet snapshot, polled by the dashboard map.
async fn list_vehicles(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Vehicle>>> {
    Ok(Json(state.store.list_vehicles().await?))
}

/// Action-discriminated mutation request.
///
/// `delete` and `toggleLock` need only `id`; any other (or absent)
/// action upserts `vehicle`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VehicleMutation {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    vehicle: Option<VehicleInput>,
}

/// Mutation response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct VehicleMutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Vehicle>,
}

async fn mutate_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<VehicleMutation>,
) -> Result<Json<VehicleMutationResponse>> {
    match request.action.as_deref() {
        Some("delete") => {
            let id = required_id(request.id)?;
            if !state.store.delete_vehicle(&id).await? {
                return Err(AppError::NotFound(format!("Vehicle {} not found", id)));
            }
            tracing::info!(user_id = %user.user_id, vehicle_id = %id, "Vehicle deleted");
            Ok(Json(VehicleMutationResponse {
                success: true,
                vehicle: None,
            }))
        }
        Some("toggleLock") => {
            let id = required_id(request.id)?;
            let vehicle = state
                .store
                .toggle_lock(&id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Vehicle {} not found", id)))?;
            tracing::info!(
                user_id = %user.user_id,
                vehicle_id = %id,
                locked = vehicle.is_locked,
                "Vehicle lock toggled"
            );
            Ok(Json(VehicleMutationResponse {
                success: true,
                vehicle: Some(vehicle),
            }))
        }
        _ => {
            let input = request
                .vehicle
                .ok_or_else(|| AppError::BadRequest("Missing 'vehicle' payload".to_string()))?;
            let vehicle = upsert_vehicle(&state, input).await?;
            tracing::info!(user_id = %user.user_id, vehicle_id = %vehicle.id, "Vehicle saved");
            Ok(Json(VehicleMutationResponse {
                success: true,
                vehicle: Some(vehicle),
            }))
        }
    }
}

fn required_id(id: Option<String>) -> Result<String> {
    id.filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing 'id'".to_string()))
}

async fn upsert_vehicle(state: &AppState, input: VehicleInput) -> Result<Vehicle> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let (id, existing) = match input.id.clone() {
        Some(id) => {
            let existing = state.store.get_vehicle(&id).await?;
            (id, existing)
        }
        None => (new_vehicle_id(), None),
    };

    let vehicle = input.into_vehicle(id, existing);
    state.store.upsert_vehicle(&vehicle).await?;
    Ok(vehicle)
}

/// Time-ordered vehicle ID. Nanosecond resolution is plenty for manual
/// fleet edits.
fn new_vehicle_id() -> String {
    let now = chrono::Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros() * 1000);
    format!("veh_{:x}", nanos)
}
