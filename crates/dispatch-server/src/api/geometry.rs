//! Geometry endpoints: thin wrappers over the geodesic primitives.
//!
//! Contract: invalid input never errors — the response is a 200 with a
//! null body.

use axum::Json;
use serde::Deserialize;

use dispatch_core::geo;
use dispatch_core::models::{Position, Region};

#[derive(Debug, Deserialize)]
pub struct PositionPair {
    pub position1: Position,
    pub position2: Position,
}

#[derive(Debug, Deserialize)]
pub struct NextPositionRequest {
    pub start: Position,
    pub angle: f64,
}

#[derive(Debug, Deserialize)]
pub struct RegionCheckRequest {
    pub position: Position,
    pub region: Region,
}

pub async fn distance_to(Json(pair): Json<PositionPair>) -> Json<Option<f64>> {
    Json(geo::distance(pair.position1, pair.position2).ok())
}

pub async fn is_close_to(Json(pair): Json<PositionPair>) -> Json<Option<bool>> {
    Json(geo::is_close(pair.position1, pair.position2).ok())
}

pub async fn next_position(Json(req): Json<NextPositionRequest>) -> Json<Option<Position>> {
    Json(geo::next_position(req.start, req.angle).ok())
}

pub async fn is_in_region(Json(req): Json<RegionCheckRequest>) -> Json<Option<bool>> {
    if !req.position.is_valid() || !req.region.is_well_formed() {
        return Json(None);
    }
    Json(Some(geo::point_in_polygon(
        req.position,
        &req.region.vertices,
    )))
}
