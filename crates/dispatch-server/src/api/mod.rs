//! API routes for the dispatch server.

mod dispatch;
mod drones;
mod geometry;
mod routes;


use crate::state::AppState;
use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}
