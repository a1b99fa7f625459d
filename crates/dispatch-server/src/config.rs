//! Server configuration from environment.

use std::env;

const DEFAULT_ILP_ENDPOINT: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub ilp_endpoint: String,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("DISPATCH_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            // A blank value falls back to the default, same as unset.
            ilp_endpoint: env::var("ILP_ENDPOINT")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ILP_ENDPOINT.to_string()),
            allowed_origins: env::var("DISPATCH_ALLOWED_ORIGINS")
                .map(|value| {
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}
