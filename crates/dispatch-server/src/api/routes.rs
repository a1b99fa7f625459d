//! REST API routes.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::{dispatch, drones, geometry};
use crate::state::AppState;

/// Fixed identifier reported by `/uid`.
const SERVICE_UID: &str = "dispatch-planner-2";

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(welcome))
        .route("/uid", get(uid))
        // Fleet query routes
        .route("/dronesWithCooling/:state", get(drones::drones_with_cooling))
        .route("/droneDetails/:id", get(drones::drone_details))
        .route("/queryAsPath/:attribute/:value", get(drones::query_as_path))
        .route("/query", post(drones::query))
        .route("/queryAvailableDrones", post(drones::query_available_drones))
        // Planning routes
        .route("/calcDeliveryPath", post(dispatch::calc_delivery_path))
        .route(
            "/calcDeliveryPathAsGeoJson",
            post(dispatch::calc_delivery_path_as_geojson),
        )
        // Geometry routes
        .route("/distanceTo", post(geometry::distance_to))
        .route("/isCloseTo", post(geometry::is_close_to))
        .route("/nextPosition", post(geometry::next_position))
        .route("/isInRegion", post(geometry::is_in_region))
}

async fn welcome() -> &'static str {
    "Medical-delivery dispatch planner. POST dispatch records to /calcDeliveryPath."
}

async fn uid() -> &'static str {
    SERVICE_UID
}
