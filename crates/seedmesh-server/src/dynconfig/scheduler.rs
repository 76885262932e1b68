//! Scheduler role payload and typed getters

use super::error::{Error, Result};
use super::store::Dynconfig;
use crate::resolver::{HealthProbe, ResolvedAddress, SeedPeerResolver};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use seedmesh_core::{Application, Scheduler, SeedPeer};

/// Cache file name of the scheduler store
pub const SCHEDULER_CACHE_FILE_NAME: &str = "scheduler";

/// What a scheduler node learns from the manager
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerDynconfigData {
    pub scheduler: Scheduler,
    pub applications: Vec<Application>,
}

pub type SchedulerDynconfig = Dynconfig<SchedulerDynconfigData>;

impl Dynconfig<SchedulerDynconfigData> {
    pub async fn get_applications(&self) -> Result<Vec<Application>> {
        Ok(self.get().await?.applications.clone())
    }

    pub async fn get_seed_peers(&self) -> Result<Vec<SeedPeer>> {
        Ok(self.get().await?.scheduler.seed_peers.clone())
    }

    /// Decode the scheduler cluster's `config` blob.
    pub async fn get_scheduler_cluster_config<C: DeserializeOwned>(&self) -> Result<C> {
        let data = self.get().await?;
        let cluster = data
            .scheduler
            .scheduler_cluster
            .as_ref()
            .ok_or(Error::MissingConfig("scheduler cluster"))?;
        Ok(serde_json::from_slice(&cluster.config)?)
    }

    /// Decode the scheduler cluster's `client_config` blob.
    pub async fn get_scheduler_cluster_client_config<C: DeserializeOwned>(&self) -> Result<C> {
        let data = self.get().await?;
        let cluster = data
            .scheduler
            .scheduler_cluster
            .as_ref()
            .ok_or(Error::MissingConfig("scheduler cluster"))?;
        Ok(serde_json::from_slice(&cluster.client_config)?)
    }

    /// Reachable, deduplicated seed peer addresses for the current payload.
    pub async fn get_resolve_seed_peer_addrs<P: HealthProbe>(
        &self,
        resolver: &SeedPeerResolver<P>,
    ) -> Result<Vec<ResolvedAddress>> {
        let data = self.get().await?;
        resolver.resolve_payload(&data).await
    }
}

/// Decode a seed peer's cluster `config` blob.
pub fn seed_peer_cluster_config<C: DeserializeOwned>(seed_peer: &SeedPeer) -> Result<C> {
    let cluster = seed_peer
        .seed_peer_cluster
        .as_ref()
        .ok_or(Error::MissingConfig("seed peer cluster"))?;
    Ok(serde_json::from_slice(&cluster.config)?)
}
