//! HTTP API Module
//!
//! Operational endpoints for the seedmesh server.
//!
//! This module contains:
//! - `state`: Shared application state
//! - `health`: Liveness and readiness probes
//! - `metrics`: Prometheus metrics endpoint
//! - `dynconfig`: Current dynconfig payload and resolved seed peers
//! - `version`: Build metadata

mod dynconfig;
mod health;
mod metrics;
mod state;
mod version;

pub use state::{AppState, RoleDynconfig};

use axum::{routing::get, Router};

/// Create the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health checks
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Observability
        .route("/metrics", get(metrics::get_metrics))
        .route("/version", get(version::get_version))
        // Dynconfig
        .route("/dynconfig", get(dynconfig::get_dynconfig))
        .route("/dynconfig/seed-peers", get(dynconfig::get_seed_peer_addrs))
        .with_state(state)
}
