//! Application State
//!
//! Shared state passed to all API handlers.

use crate::dynconfig::{self, CdnDynconfig, DynconfigState, SchedulerDynconfig};
use crate::observability::MetricsState;
use crate::resolver::ResolvedAddress;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::watch;

/// The store for the role this node runs as
#[derive(Clone)]
pub enum RoleDynconfig {
    Scheduler(Arc<SchedulerDynconfig>),
    Cdn(Arc<CdnDynconfig>),
}

impl RoleDynconfig {
    pub fn role(&self) -> &'static str {
        match self {
            RoleDynconfig::Scheduler(_) => "scheduler",
            RoleDynconfig::Cdn(_) => "cdn",
        }
    }

    pub fn state(&self) -> DynconfigState {
        match self {
            RoleDynconfig::Scheduler(dynconfig) => dynconfig.state(),
            RoleDynconfig::Cdn(dynconfig) => dynconfig.state(),
        }
    }

    /// Current payload as JSON
    pub async fn snapshot(&self) -> dynconfig::Result<serde_json::Value> {
        let value = match self {
            RoleDynconfig::Scheduler(dynconfig) => serde_json::to_value(&*dynconfig.get().await?)?,
            RoleDynconfig::Cdn(dynconfig) => serde_json::to_value(&*dynconfig.get().await?)?,
        };
        Ok(value)
    }

    /// Live observers registered on the store
    pub async fn observer_count(&self) -> usize {
        match self {
            RoleDynconfig::Scheduler(dynconfig) => dynconfig.observer_count().await,
            RoleDynconfig::Cdn(dynconfig) => dynconfig.observer_count().await,
        }
    }

    pub async fn is_loaded(&self) -> bool {
        match self {
            RoleDynconfig::Scheduler(dynconfig) => dynconfig.get().await.is_ok(),
            RoleDynconfig::Cdn(dynconfig) => dynconfig.get().await.is_ok(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub node_id: String,
    pub dynconfig: RoleDynconfig,
    /// Reachable seed peers, scheduler role only
    pub seed_peer_addrs: Option<watch::Receiver<Vec<ResolvedAddress>>>,
    pub readiness: Arc<AtomicBool>,
    pub metrics_state: Option<MetricsState>,
}
