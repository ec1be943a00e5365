//! Health check endpoint.
//!
//! Liveness only: no database round trip, so load balancers can probe it
//! without holding a pool connection.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service name, for probes shared across deployments.
    pub service: &'static str,
    /// Running version.
    pub version: &'static str,
}

/// GET /health - Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "annostore",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
