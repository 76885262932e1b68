//! Dynconfig Endpoints
//!
//! Read-only views of the node's current dynconfig.

use super::state::AppState;
use crate::dynconfig::DynconfigState;
use crate::resolver::ResolvedAddress;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DynconfigResponse {
    pub node_id: String,
    pub role: &'static str,
    pub state: DynconfigState,
    pub observers: usize,
    pub data: serde_json::Value,
}

/// GET /dynconfig - current payload of this node's store
pub async fn get_dynconfig(
    State(state): State<AppState>,
) -> Result<Json<DynconfigResponse>, (StatusCode, String)> {
    let data = state
        .dynconfig
        .snapshot()
        .await
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;

    Ok(Json(DynconfigResponse {
        node_id: state.node_id.clone(),
        role: state.dynconfig.role(),
        state: state.dynconfig.state(),
        observers: state.dynconfig.observer_count().await,
        data,
    }))
}

/// GET /dynconfig/seed-peers - last resolved seed peer addresses
pub async fn get_seed_peer_addrs(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResolvedAddress>>, (StatusCode, String)> {
    let addrs = state.seed_peer_addrs.as_ref().ok_or((
        StatusCode::NOT_FOUND,
        format!("seed peers are not resolved by the {} role", state.dynconfig.role()),
    ))?;

    Ok(Json(addrs.borrow().clone()))
}
