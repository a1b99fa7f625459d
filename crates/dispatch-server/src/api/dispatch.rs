//! Delivery-path planning endpoints.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use crate::state::AppState;
use dispatch_core::models::{DispatchPlan, DispatchRecord};
use dispatch_core::planner;

/// Plan the batch and return the full step-by-step result.
pub async fn calc_delivery_path(
    State(state): State<Arc<AppState>>,
    Json(records): Json<Vec<DispatchRecord>>,
) -> Json<DispatchPlan> {
    let snapshot = state.fleet.snapshot().await;
    let plan = planner::plan_dispatch(&snapshot, &records);
    tracing::info!(
        "Planned {} of {} deliveries across {} sorties ({} moves, cost {:.2})",
        plan.drone_paths
            .iter()
            .flat_map(|path| path.deliveries.iter())
            .filter(|leg| leg.delivery_id != planner::RETURN_LEG_ID)
            .count(),
        records.len(),
        plan.drone_paths.len(),
        plan.total_moves,
        plan.total_cost
    );
    Json(plan)
}

/// Plan the batch as a single-drone sortie and return its flight path as a
/// GeoJSON LineString. Infeasible batches yield the empty LineString.
pub async fn calc_delivery_path_as_geojson(
    State(state): State<Arc<AppState>>,
    Json(records): Json<Vec<DispatchRecord>>,
) -> impl IntoResponse {
    let snapshot = state.fleet.snapshot().await;
    let geojson = planner::plan_geojson(&snapshot, &records);
    ([(header::CONTENT_TYPE, "application/geo+json")], geojson)
}
