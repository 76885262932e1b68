//! Manager Client
//!
//! Boundary to the control plane. `ManagerClient` is the RPC surface the
//! dynconfig sources consume; errors stay `tonic::Status` so adapters can
//! carry gRPC codes through unchanged.

mod cdn;
mod etcd;
mod scheduler;

pub use cdn::CdnManagerSource;
pub use etcd::{keys, EtcdManagerClient};
pub use scheduler::SchedulerManagerSource;

use async_trait::async_trait;
use seedmesh_core::{Application, Cdn, Scheduler, SourceType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSchedulerRequest {
    pub source_type: SourceType,
    pub host_name: String,
    pub ip: String,
    pub scheduler_cluster_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListApplicationsRequest {
    pub source_type: SourceType,
    pub host_name: String,
    pub ip: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCdnRequest {
    pub source_type: SourceType,
    pub host_name: String,
    pub cdn_cluster_id: u64,
}

#[async_trait]
pub trait ManagerClient: Send + Sync {
    async fn get_scheduler(&self, request: GetSchedulerRequest) -> Result<Scheduler, tonic::Status>;

    async fn list_applications(
        &self,
        request: ListApplicationsRequest,
    ) -> Result<Vec<Application>, tonic::Status>;

    async fn get_cdn(&self, request: GetCdnRequest) -> Result<Cdn, tonic::Status>;
}
