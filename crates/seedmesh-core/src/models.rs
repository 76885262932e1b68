//! Manager Models
//!
//! Records published by the manager (control plane) and consumed by the
//! dynconfig stores. Cluster configs are opaque blobs; see [`crate::blob`].

use crate::cluster::HostType;
use serde::{Deserialize, Serialize};

/// Identifies the kind of node talking to the manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    #[default]
    SchedulerSource,
    PeerSource,
    SeedPeerSource,
}

/// Scheduler descriptor as seen by a scheduler node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scheduler {
    pub id: u64,
    pub host_name: String,
    pub idc: String,
    pub location: String,
    pub ip: String,
    pub port: i32,
    pub state: String,
    pub scheduler_cluster_id: u64,
    pub scheduler_cluster: Option<SchedulerCluster>,
    /// Seed peers serving this scheduler's cluster
    pub seed_peers: Vec<SeedPeer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerCluster {
    pub id: u64,
    pub name: String,
    pub bio: String,
    #[serde(with = "crate::blob")]
    pub config: Vec<u8>,
    #[serde(with = "crate::blob")]
    pub client_config: Vec<u8>,
    #[serde(with = "crate::blob")]
    pub scopes: Vec<u8>,
}

/// A seed peer advertised by the manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedPeer {
    pub id: u64,
    pub host_name: String,
    /// Host type name, see [`HostType`]
    #[serde(rename = "type")]
    pub kind: String,
    pub idc: String,
    pub location: String,
    pub ip: String,
    pub port: i32,
    pub download_port: i32,
    pub state: String,
    pub seed_peer_cluster_id: u64,
    pub seed_peer_cluster: Option<SeedPeerCluster>,
}

impl SeedPeer {
    pub fn host_type(&self) -> HostType {
        HostType::parse(&self.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedPeerCluster {
    pub id: u64,
    pub name: String,
    pub bio: String,
    #[serde(with = "crate::blob")]
    pub config: Vec<u8>,
    #[serde(with = "crate::blob")]
    pub scopes: Vec<u8>,
}

/// Application-level download policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub bio: String,
    pub priority: Option<ApplicationPriority>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationPriority {
    pub value: i32,
    pub urls: Vec<UrlPriority>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlPriority {
    pub regex: String,
    pub value: i32,
}

/// Scheduler endpoint as seen by a CDN node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerInstance {
    #[serde(rename = "host_name")]
    pub hostname: String,
    pub ip: String,
    pub port: i32,
}

/// Scheduler cluster policy blobs delivered to CDN nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdnSchedulerCluster {
    #[serde(with = "crate::blob")]
    pub config: Vec<u8>,
    #[serde(with = "crate::blob")]
    pub client_config: Vec<u8>,
}

/// CDN descriptor as seen by a CDN node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cdn {
    pub id: u64,
    pub host_name: String,
    pub idc: String,
    pub location: String,
    pub ip: String,
    pub port: i32,
    pub download_port: i32,
    pub cdn_cluster_id: u64,
    pub scheduler_cluster: Option<CdnSchedulerCluster>,
    pub schedulers: Vec<SchedulerInstance>,
}
