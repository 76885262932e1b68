//! CDN dynconfig source

use super::{GetCdnRequest, ManagerClient};
use crate::config::HostConfig;
use crate::dynconfig::{CdnDynconfigData, DynconfigSource, Result};
use async_trait::async_trait;
use seedmesh_core::SourceType;
use std::sync::Arc;
use tracing::debug;

/// Fetches the scheduler list this CDN node should announce to.
pub struct CdnManagerSource {
    client: Arc<dyn ManagerClient>,
    host: HostConfig,
}

impl CdnManagerSource {
    pub fn new(client: Arc<dyn ManagerClient>, host: HostConfig) -> Self {
        Self { client, host }
    }
}

#[async_trait]
impl DynconfigSource<CdnDynconfigData> for CdnManagerSource {
    async fn fetch(&self) -> Result<CdnDynconfigData> {
        let cdn = self
            .client
            .get_cdn(GetCdnRequest {
                source_type: SourceType::SchedulerSource,
                host_name: self.host.hostname.clone(),
                cdn_cluster_id: self.host.cdn_cluster_id,
            })
            .await?;

        debug!(schedulers = cdn.schedulers.len(), "Fetched cdn dynconfig");
        Ok(cdn.into())
    }
}
