//! Non-relay responses.
//!
//! # Responsibilities
//! - Liveness text on `GET /`
//! - JSON status on `GET /health`
//!
//! Relay replies and relay errors render themselves (`RelayReply`,
//! `RelayError`).

use axum::Json;
use serde::Serialize;

pub const LIVENESS_TEXT: &str = "API relay running. Use /relay with x-api-key header.";

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
