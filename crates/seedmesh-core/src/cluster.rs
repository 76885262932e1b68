//! Cluster Config Schemas
//!
//! Default schemas for the opaque cluster config blobs published by the
//! manager, and the seed peer host types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Scheduler cluster scheduling policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerClusterConfig {
    /// Number of candidate parents handed to a peer
    pub candidate_parent_limit: u32,
    /// Number of parents evaluated before filtering
    pub filter_parent_limit: u32,
}

/// Client-side policy for peers in a scheduler cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerClusterClientConfig {
    /// Upload load limit per peer
    pub load_limit: u32,
}

/// Seed peer cluster policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedPeerClusterConfig {
    /// Upload load limit per seed peer
    pub load_limit: u32,
}

/// Type of a host in the distribution mesh.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr,
)]
pub enum HostType {
    #[default]
    #[strum(serialize = "normal")]
    Normal,
    #[strum(serialize = "super")]
    SuperSeed,
    #[strum(serialize = "strong")]
    StrongSeed,
    #[strum(serialize = "weak")]
    WeakSeed,
}

impl HostType {
    /// Name of the host type as advertised by the manager.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Parse a host type name. Unknown names are normal hosts.
    pub fn parse(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    pub fn is_seed(&self) -> bool {
        !matches!(self, HostType::Normal)
    }
}
