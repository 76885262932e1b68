//! Etcd Manager Client
//!
//! Reads the JSON records the manager publishes into etcd. Missing records
//! map to `NOT_FOUND`, etcd failures to `UNAVAILABLE`.

use super::{GetCdnRequest, GetSchedulerRequest, ListApplicationsRequest, ManagerClient};
use crate::config::ManagerConfig;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use etcd_client::{Client, GetOptions};
use seedmesh_core::{Application, Cdn, Scheduler};
use serde::de::DeserializeOwned;
use tonic::Status;
use tracing::{debug, trace, warn};

/// Etcd key layout of manager records
pub mod keys {
    pub const PREFIX: &str = "/seedmesh/v1";

    pub fn scheduler(scheduler_cluster_id: u64, host_name: &str) -> String {
        format!("{PREFIX}/scheduler-clusters/{scheduler_cluster_id}/schedulers/{host_name}")
    }

    pub fn applications_prefix() -> String {
        format!("{PREFIX}/applications/")
    }

    pub fn cdn(cdn_cluster_id: u64, host_name: &str) -> String {
        format!("{PREFIX}/cdn-clusters/{cdn_cluster_id}/cdns/{host_name}")
    }
}

pub struct EtcdManagerClient {
    client: Client,
}

impl EtcdManagerClient {
    /// Connect to etcd with exponential backoff
    pub async fn connect(config: &ManagerConfig) -> Result<Self> {
        let backoff = ExponentialBackoff {
            initial_interval: config.etcd_backoff_initial,
            max_interval: config.etcd_backoff_max,
            max_elapsed_time: Some(config.etcd_backoff_max_elapsed),
            multiplier: config.etcd_backoff_multiplier,
            ..Default::default()
        };

        let endpoints = &config.etcd_endpoints;
        let client = retry(backoff, || async {
            match Client::connect(endpoints, None).await {
                Ok(client) => {
                    debug!(endpoints = ?endpoints, "Connected to etcd");
                    Ok(client)
                }
                Err(e) => {
                    warn!(error = %e, "etcd connection failed, retrying");
                    Err(backoff::Error::transient(e))
                }
            }
        })
        .await
        .map_err(|e| anyhow!("Failed to connect to etcd after retries: {:?}", e))?;

        Ok(Self { client })
    }

    async fn get_record<T: DeserializeOwned>(&self, key: &str) -> Result<T, Status> {
        let mut client = self.client.clone();
        let response = client.get(key, None).await.map_err(unavailable)?;
        let value = response.kvs().first().map(|kv| kv.value());
        decode_record(key, value)
    }
}

#[async_trait]
impl ManagerClient for EtcdManagerClient {
    async fn get_scheduler(&self, request: GetSchedulerRequest) -> Result<Scheduler, Status> {
        let key = keys::scheduler(request.scheduler_cluster_id, &request.host_name);
        trace!(key = %key, ip = %request.ip, "Reading scheduler record");
        self.get_record(&key).await
    }

    async fn list_applications(
        &self,
        _request: ListApplicationsRequest,
    ) -> Result<Vec<Application>, Status> {
        let prefix = keys::applications_prefix();
        let mut client = self.client.clone();
        let response = client
            .get(prefix.as_str(), Some(GetOptions::new().with_prefix()))
            .await
            .map_err(unavailable)?;

        let mut applications = Vec::with_capacity(response.kvs().len());
        for kv in response.kvs() {
            match serde_json::from_slice::<Application>(kv.value()) {
                Ok(application) => applications.push(application),
                Err(e) => {
                    warn!(
                        key = %String::from_utf8_lossy(kv.key()),
                        error = %e,
                        "Skipping malformed application record"
                    );
                }
            }
        }

        Ok(applications)
    }

    async fn get_cdn(&self, request: GetCdnRequest) -> Result<Cdn, Status> {
        let key = keys::cdn(request.cdn_cluster_id, &request.host_name);
        trace!(key = %key, "Reading cdn record");
        self.get_record(&key).await
    }
}

fn unavailable(e: etcd_client::Error) -> Status {
    Status::unavailable(format!("etcd: {e}"))
}

fn decode_record<T: DeserializeOwned>(key: &str, value: Option<&[u8]>) -> Result<T, Status> {
    let value = value.ok_or_else(|| Status::not_found(format!("no manager record at {key}")))?;
    serde_json::from_slice(value)
        .map_err(|e| Status::internal(format!("malformed manager record at {key}: {e}")))
}
