//! Read-only HTTP client for the Information-Logistics Platform.

mod client;

pub use client::IlpClient;
