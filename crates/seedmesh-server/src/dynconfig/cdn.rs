//! CDN role payload and typed getters

use super::error::{Error, Result};
use super::store::Dynconfig;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use seedmesh_core::{Cdn, CdnSchedulerCluster, SchedulerInstance};

/// Cache file name of the CDN store
pub const CDN_CACHE_FILE_NAME: &str = "cdn_dynconfig";

/// What a CDN node learns from the manager
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdnDynconfigData {
    pub schedulers: Vec<SchedulerInstance>,
    pub scheduler_cluster: Option<CdnSchedulerCluster>,
}

impl From<Cdn> for CdnDynconfigData {
    fn from(cdn: Cdn) -> Self {
        Self {
            schedulers: cdn.schedulers,
            scheduler_cluster: cdn.scheduler_cluster,
        }
    }
}

pub type CdnDynconfig = Dynconfig<CdnDynconfigData>;

impl Dynconfig<CdnDynconfigData> {
    pub async fn get_schedulers(&self) -> Result<Vec<SchedulerInstance>> {
        Ok(self.get().await?.schedulers.clone())
    }

    /// Decode the scheduler cluster's `config` blob.
    pub async fn get_scheduler_cluster_config<C: DeserializeOwned>(&self) -> Result<C> {
        let data = self.get().await?;
        let cluster = data
            .scheduler_cluster
            .as_ref()
            .ok_or(Error::MissingConfig("scheduler cluster"))?;
        Ok(serde_json::from_slice(&cluster.config)?)
    }
}
