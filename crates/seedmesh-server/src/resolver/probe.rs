//! Seed peer health probes

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tonic::transport::{ClientTlsConfig, Endpoint};
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid endpoint: {0}")]
    Endpoint(#[source] tonic::transport::Error),

    #[error("connect: {0}")]
    Connect(#[source] tonic::transport::Error),

    #[error("health check: {0}")]
    Rpc(#[from] tonic::Status),

    #[error("peer reported {0}")]
    NotServing(&'static str),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Liveness check for a dial address (`ip:port`).
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self, addr: &str) -> Result<(), ProbeError>;
}

/// `grpc.health.v1.Health/Check` with an empty service name.
#[derive(Debug, Clone)]
pub struct GrpcHealthProbe {
    tls: Option<ClientTlsConfig>,
    timeout: Duration,
}

impl GrpcHealthProbe {
    /// Probe over TLS when `tls` is set, plaintext otherwise. `timeout` bounds
    /// connect and RPC together.
    pub fn new(tls: Option<ClientTlsConfig>, timeout: Duration) -> Self {
        Self { tls, timeout }
    }

    fn endpoint(&self, addr: &str) -> Result<Endpoint, ProbeError> {
        let scheme = if self.tls.is_some() { "https" } else { "http" };
        let endpoint = Endpoint::from_shared(format!("{scheme}://{addr}"))
            .map_err(ProbeError::Endpoint)?
            .connect_timeout(self.timeout)
            .timeout(self.timeout);

        match &self.tls {
            Some(tls) => endpoint
                .tls_config(tls.clone())
                .map_err(ProbeError::Endpoint),
            None => Ok(endpoint),
        }
    }

    async fn check_serving(endpoint: Endpoint) -> Result<(), ProbeError> {
        let channel = endpoint.connect().await.map_err(ProbeError::Connect)?;
        let response = HealthClient::new(channel)
            .check(HealthCheckRequest {
                service: String::new(),
            })
            .await?;

        match response.into_inner().status() {
            ServingStatus::Serving => Ok(()),
            status => Err(ProbeError::NotServing(status.as_str_name())),
        }
    }
}

#[async_trait]
impl HealthProbe for GrpcHealthProbe {
    async fn check(&self, addr: &str) -> Result<(), ProbeError> {
        let endpoint = self.endpoint(addr)?;
        tokio::time::timeout(self.timeout, Self::check_serving(endpoint))
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
    }
}
