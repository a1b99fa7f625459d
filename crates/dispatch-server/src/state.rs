//! Application state shared across handlers.

use dispatch_core::models::FleetSnapshot;
use dispatch_ilp::IlpClient;

use crate::config::Config;

/// Where fleet data comes from: the live platform in production, a fixed
/// snapshot in tests. Planning always works from a fresh snapshot; nothing
/// is cached across calls.
pub enum FleetSource {
    Remote(IlpClient),
    #[allow(dead_code)] // Constructed by the API tests
    Fixed(FleetSnapshot),
}

impl FleetSource {
    pub async fn snapshot(&self) -> FleetSnapshot {
        match self {
            Self::Remote(client) => client.snapshot().await,
            Self::Fixed(snapshot) => snapshot.clone(),
        }
    }
}

pub struct AppState {
    pub config: Config,
    pub fleet: FleetSource,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let fleet = FleetSource::Remote(IlpClient::new(config.ilp_endpoint.clone()));
        Self { config, fleet }
    }

    #[cfg(test)]
    pub fn with_snapshot(config: Config, snapshot: FleetSnapshot) -> Self {
        Self {
            config,
            fleet: FleetSource::Fixed(snapshot),
        }
    }
}
