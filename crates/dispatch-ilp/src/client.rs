//! ILP API HTTP client.

use anyhow::{Context, Result};
use dispatch_core::models::{Drone, FleetSnapshot, Region, ServicePoint, ServicePointRoster};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the upstream Information-Logistics Platform.
///
/// Every accessor is a plain GET of a JSON array. The platform is treated
/// as best-effort: `snapshot` degrades each missing collection to empty so
/// a flaky upstream produces an empty plan rather than an error.
pub struct IlpClient {
    client: Client,
    base_url: String,
}

impl IlpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_collection<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("GET {} returned an error status", url))?;
        response
            .json()
            .await
            .with_context(|| format!("GET {} returned malformed JSON", url))
    }

    /// Fetch the drone fleet.
    pub async fn fetch_drones(&self) -> Result<Vec<Drone>> {
        self.fetch_collection("drones").await
    }

    /// Fetch all service points (drone home bases).
    pub async fn fetch_service_points(&self) -> Result<Vec<ServicePoint>> {
        self.fetch_collection("service-points").await
    }

    /// Fetch the drones-for-service-points availability table.
    pub async fn fetch_availability(&self) -> Result<Vec<ServicePointRoster>> {
        self.fetch_collection("drones-for-service-points").await
    }

    /// Fetch the restricted-area polygons.
    pub async fn fetch_restricted_areas(&self) -> Result<Vec<Region>> {
        self.fetch_collection("restricted-areas").await
    }

    /// Assemble a fleet snapshot for one planning call. Each collection
    /// that cannot be fetched is logged and treated as empty.
    pub async fn snapshot(&self) -> FleetSnapshot {
        let drones = self.fetch_drones().await.unwrap_or_else(|err| {
            tracing::warn!("drones unavailable, planning with none: {:#}", err);
            Vec::new()
        });
        let service_points = self.fetch_service_points().await.unwrap_or_else(|err| {
            tracing::warn!("service points unavailable, planning with none: {:#}", err);
            Vec::new()
        });
        let availability = self.fetch_availability().await.unwrap_or_else(|err| {
            tracing::warn!("availability table unavailable, planning with none: {:#}", err);
            Vec::new()
        });
        let regions = self.fetch_restricted_areas().await.unwrap_or_else(|err| {
            tracing::warn!("restricted areas unavailable, planning without: {:#}", err);
            Vec::new()
        });

        FleetSnapshot {
            drones,
            service_points,
            availability,
            regions,
        }
    }
}
