//! Fleet query endpoints.
//!
//! All of these answer from a fresh fleet snapshot and return drone id
//! lists; an unreachable platform degrades to an empty list.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::state::AppState;
use dispatch_core::eligibility;
use dispatch_core::models::{DispatchRecord, Drone};
use dispatch_core::query::{matches_all, matches_attribute, QueryAttribute};

/// Drones whose cooling flag equals the path parameter.
pub async fn drones_with_cooling(
    State(state): State<Arc<AppState>>,
    Path(cooling): Path<bool>,
) -> Json<Vec<String>> {
    let snapshot = state.fleet.snapshot().await;
    let ids = snapshot
        .drones
        .iter()
        .filter(|drone| matches_attribute(drone, "cooling", &cooling.to_string()))
        .map(|drone| drone.id.clone())
        .collect();
    Json(ids)
}

/// Full drone record by id.
pub async fn drone_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Drone>, StatusCode> {
    let snapshot = state.fleet.snapshot().await;
    snapshot
        .drones
        .into_iter()
        .find(|drone| drone.id == id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Single-attribute equality match, both operands as path segments.
pub async fn query_as_path(
    State(state): State<Arc<AppState>>,
    Path((attribute, value)): Path<(String, String)>,
) -> Json<Vec<String>> {
    let snapshot = state.fleet.snapshot().await;
    let ids = snapshot
        .drones
        .iter()
        .filter(|drone| matches_attribute(drone, &attribute, &value))
        .map(|drone| drone.id.clone())
        .collect();
    Json(ids)
}

/// Structured multi-attribute query; invalid entries are dropped before
/// matching, so an all-invalid body matches the whole fleet.
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(queries): Json<Vec<QueryAttribute>>,
) -> Json<Vec<String>> {
    let snapshot = state.fleet.snapshot().await;
    let ids = snapshot
        .drones
        .iter()
        .filter(|drone| matches_all(drone, &queries))
        .map(|drone| drone.id.clone())
        .collect();
    Json(ids)
}

/// Drones that can serve and are available for every record in the batch.
pub async fn query_available_drones(
    State(state): State<Arc<AppState>>,
    Json(records): Json<Vec<DispatchRecord>>,
) -> Json<Vec<String>> {
    let snapshot = state.fleet.snapshot().await;
    let ids = eligibility::drones_serving_all(&snapshot, &records)
        .into_iter()
        .map(|drone| drone.id.clone())
        .collect();
    Json(ids)
}
