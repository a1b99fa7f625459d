//! Dispatch Server - REST facade for the medical-delivery dispatch planner

mod api;
mod config;
mod state;

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("dispatch_server=debug".parse()?);
    let log_format = std::env::var("DISPATCH_LOG_FORMAT").unwrap_or_default();
    if log_format.trim().eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("Starting dispatch server...");

    let config = Config::from_env();
    let port = config.server_port;

    let state = Arc::new(AppState::new(config.clone()));
    tracing::info!("Fleet data from {}", state.config.ilp_endpoint);

    let app = api::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let app = if config.allowed_origins.is_empty() {
        tracing::warn!("No CORS origins configured - CORS disabled (same-origin only)");
        app
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {},
                _ = sigterm.recv() => {},
            }
        }
        Err(err) => {
            tracing::warn!("Failed to install SIGTERM handler (CTRL-C only): {}", err);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
