//! Geodesic primitives for the discrete-step movement model.
//!
//! Longitude wraps at the antimeridian; latitude is clamped — a move past a
//! pole is rejected outright.

use crate::models::{Position, Region};
use thiserror::Error;

/// Fixed lng/lat delta per drone move.
pub const STEP: f64 = 0.00015;
/// Two positions closer than this are considered the same place.
pub const CLOSE_THRESHOLD: f64 = 0.00015;

/// The 16-point compass, degrees CCW from east.
pub const COMPASS_ANGLES: [f64; 16] = [
    0.0, 22.5, 45.0, 67.5, 90.0, 112.5, 135.0, 157.5, 180.0, 202.5, 225.0, 247.5, 270.0, 292.5,
    315.0, 337.5,
];

/// Tolerance for the collinearity test when checking polygon boundaries.
const BOUNDARY_EPSILON: f64 = 1e-12;

/// Samples taken along a segment when testing restricted-area entry.
const SEGMENT_SAMPLES: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoError {
    #[error("position out of range or non-finite")]
    InvalidPosition,
    #[error("angle {0} is not on the 16-point compass")]
    InvalidAngle(f64),
    #[error("move leaves the legal latitude range")]
    InvalidMove,
}

/// Grid cell key: positions within half a step of the same cell collapse
/// onto one key. Used for the pathfinder's visited/recency bookkeeping.
pub type GridKey = (i64, i64);

pub fn grid_key(position: Position) -> GridKey {
    (
        (position.lng / STEP).round() as i64,
        (position.lat / STEP).round() as i64,
    )
}

/// Planar Euclidean distance in degrees.
pub fn distance(p1: Position, p2: Position) -> Result<f64, GeoError> {
    if !p1.is_valid() || !p2.is_valid() {
        return Err(GeoError::InvalidPosition);
    }
    Ok(euclidean(p1, p2))
}

/// Strictly-less-than threshold: a position exactly one step away is not close.
pub fn is_close(p1: Position, p2: Position) -> Result<bool, GeoError> {
    Ok(distance(p1, p2)? < CLOSE_THRESHOLD)
}

pub(crate) fn euclidean(p1: Position, p2: Position) -> f64 {
    let dlng = p1.lng - p2.lng;
    let dlat = p1.lat - p2.lat;
    (dlng * dlng + dlat * dlat).sqrt()
}

/// One step from `start` along a compass angle (east = 0, north = 90, CCW).
///
/// Longitude wraps modularly at ±180; a move whose latitude leaves
/// [-90, 90] is rejected — the poles are impassable.
pub fn next_position(start: Position, angle_deg: f64) -> Result<Position, GeoError> {
    if !start.is_valid() {
        return Err(GeoError::InvalidPosition);
    }
    if !COMPASS_ANGLES.contains(&angle_deg) {
        return Err(GeoError::InvalidAngle(angle_deg));
    }

    let radians = angle_deg.to_radians();
    let mut lng = start.lng + radians.cos() * STEP;
    let lat = start.lat + radians.sin() * STEP;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(GeoError::InvalidMove);
    }
    if lng > 180.0 {
        lng = -180.0 + (lng - 180.0);
    } else if lng < -180.0 {
        lng = 180.0 + (lng + 180.0);
    }

    Ok(Position { lng, lat })
}

/// Ray-casting containment over a closed ring; boundary points count as
/// inside. The ray runs rightward from the query point.
pub fn point_in_polygon(point: Position, vertices: &[Position]) -> bool {
    if vertices.len() < 2 {
        return false;
    }

    // A point on any edge is inside, no ray needed.
    for edge in vertices.windows(2) {
        if on_segment(point, edge[0], edge[1]) {
            return true;
        }
    }

    let (x, y) = (point.lng, point.lat);
    let mut inside = false;
    for edge in vertices.windows(2) {
        let (x1, y1) = (edge[0].lng, edge[0].lat);
        let (x2, y2) = (edge[1].lng, edge[1].lat);

        if y <= y1.min(y2) || y > y1.max(y2) {
            continue;
        }
        if x > x1.max(x2) {
            continue;
        }
        // Vertical edges always qualify once the x/y range checks pass;
        // otherwise the crossing point of the ray decides.
        if x1 == x2 || x <= x1 + (y - y1) * (x2 - x1) / (y2 - y1) {
            inside = !inside;
        }
    }
    inside
}

fn on_segment(p: Position, a: Position, b: Position) -> bool {
    let cross = (b.lng - a.lng) * (p.lat - a.lat) - (b.lat - a.lat) * (p.lng - a.lng);
    if cross.abs() > BOUNDARY_EPSILON {
        return false;
    }
    p.lng >= a.lng.min(b.lng)
        && p.lng <= a.lng.max(b.lng)
        && p.lat >= a.lat.min(b.lat)
        && p.lat <= a.lat.max(b.lat)
}

/// Whether the straight segment from `start` to `end` stays clear of every
/// well-formed restricted area. The segment is sampled at 100 evenly-spaced
/// points (excluding the start itself); malformed regions are skipped.
pub fn is_valid_move(start: Position, end: Position, regions: &[Region]) -> bool {
    for region in regions {
        if !region.is_well_formed() {
            continue;
        }
        for i in 1..=SEGMENT_SAMPLES {
            let t = f64::from(i) / f64::from(SEGMENT_SAMPLES);
            let sample = Position {
                lng: start.lng + t * (end.lng - start.lng),
                lat: start.lat + t * (end.lat - start.lat),
            };
            if point_in_polygon(sample, &region.vertices) {
                return false;
            }
        }
    }
    true
}
