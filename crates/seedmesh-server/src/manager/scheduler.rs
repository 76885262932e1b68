//! Scheduler dynconfig source

use super::{GetSchedulerRequest, ListApplicationsRequest, ManagerClient};
use crate::config::HostConfig;
use crate::dynconfig::{DynconfigSource, Result, SchedulerDynconfigData};
use async_trait::async_trait;
use seedmesh_core::SourceType;
use std::sync::Arc;
use tonic::Code;
use tracing::{debug, warn};

/// Fetches the scheduler descriptor and application list for this host.
pub struct SchedulerManagerSource {
    client: Arc<dyn ManagerClient>,
    host: HostConfig,
}

impl SchedulerManagerSource {
    pub fn new(client: Arc<dyn ManagerClient>, host: HostConfig) -> Self {
        Self { client, host }
    }
}

#[async_trait]
impl DynconfigSource<SchedulerDynconfigData> for SchedulerManagerSource {
    async fn fetch(&self) -> Result<SchedulerDynconfigData> {
        let scheduler = self
            .client
            .get_scheduler(GetSchedulerRequest {
                source_type: SourceType::SchedulerSource,
                host_name: self.host.hostname.clone(),
                ip: self.host.advertise_ip.clone(),
                scheduler_cluster_id: self.host.scheduler_cluster_id,
            })
            .await?;

        let applications = match self
            .client
            .list_applications(ListApplicationsRequest {
                source_type: SourceType::SchedulerSource,
                host_name: self.host.hostname.clone(),
                ip: self.host.advertise_ip.clone(),
            })
            .await
        {
            Ok(applications) => applications,
            // Older managers do not serve applications
            Err(status) if status.code() == Code::Unimplemented => {
                warn!(error = %status, "Manager does not support applications, using none");
                Vec::new()
            }
            Err(status) => return Err(status.into()),
        };

        debug!(
            seed_peers = scheduler.seed_peers.len(),
            applications = applications.len(),
            "Fetched scheduler dynconfig"
        );

        Ok(SchedulerDynconfigData {
            scheduler,
            applications,
        })
    }
}
