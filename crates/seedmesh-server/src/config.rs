//! Dynconfig Configuration
//!
//! Settings for the dynconfig store, the manager fetch and the seed peer
//! resolver, with environment variable overrides.

use std::path::PathBuf;
use std::time::Duration;

/// Dynconfig configuration with sensible defaults
#[derive(Debug, Clone)]
pub struct DynconfigConfig {
    /// Directory holding the dynconfig cache file (env: DYNCONFIG_CACHE_DIR)
    pub cache_dir: PathBuf,

    // Refresh settings
    /// Interval between background refreshes (env: DYNCONFIG_REFRESH_INTERVAL_SECS)
    pub refresh_interval: Duration,

    /// Maximum age of a cache file that may seed the store at startup
    /// (env: DYNCONFIG_EXPIRE_TIME_SECS)
    pub expire_time: Duration,

    /// Upper bound for a single manager fetch (env: DYNCONFIG_FETCH_TIMEOUT_SECS)
    pub fetch_timeout: Duration,

    // Seed peer resolution
    /// Timeout for connecting to and probing one seed peer
    /// (env: SEED_PEER_PROBE_TIMEOUT_SECS)
    pub probe_timeout: Duration,

    /// Maximum number of concurrent seed peer probes
    /// (env: SEED_PEER_PROBE_CONCURRENCY)
    pub probe_concurrency: usize,
}

impl Default for DynconfigConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("/var/cache/seedmesh"),
            refresh_interval: Duration::from_secs(10),
            expire_time: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(3),
            probe_concurrency: 8,
        }
    }
}

impl DynconfigConfig {
    /// Create configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("DYNCONFIG_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }

        if let Some(secs) = env_nonzero_secs("DYNCONFIG_REFRESH_INTERVAL_SECS") {
            config.refresh_interval = secs;
        }

        if let Some(secs) = env_secs("DYNCONFIG_EXPIRE_TIME_SECS") {
            config.expire_time = secs;
        }

        if let Some(secs) = env_secs("DYNCONFIG_FETCH_TIMEOUT_SECS") {
            config.fetch_timeout = secs;
        }

        if let Some(secs) = env_secs("SEED_PEER_PROBE_TIMEOUT_SECS") {
            config.probe_timeout = secs;
        }

        if let Ok(limit) = std::env::var("SEED_PEER_PROBE_CONCURRENCY") {
            if let Ok(parsed) = limit.parse::<usize>() {
                config.probe_concurrency = parsed.max(1);
            }
        }

        config
    }
}

/// Identity of the local node, sent to the manager on every fetch
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Hostname (env: HOSTNAME)
    pub hostname: String,

    /// Advertised IP (env: ADVERTISE_IP, falls back to POD_IP)
    pub advertise_ip: String,

    /// Scheduler cluster this node belongs to (env: SCHEDULER_CLUSTER_ID)
    pub scheduler_cluster_id: u64,

    /// CDN cluster this node belongs to (env: CDN_CLUSTER_ID)
    pub cdn_cluster_id: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            hostname: format!("seedmesh-{}", uuid::Uuid::new_v4()),
            advertise_ip: "127.0.0.1".to_string(),
            scheduler_cluster_id: 1,
            cdn_cluster_id: 1,
        }
    }
}

impl HostConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(hostname) = std::env::var("HOSTNAME") {
            config.hostname = hostname;
        }

        if let Ok(ip) = std::env::var("ADVERTISE_IP").or_else(|_| std::env::var("POD_IP")) {
            config.advertise_ip = ip;
        }

        if let Ok(id) = std::env::var("SCHEDULER_CLUSTER_ID") {
            if let Ok(parsed) = id.parse::<u64>() {
                config.scheduler_cluster_id = parsed;
            }
        }

        if let Ok(id) = std::env::var("CDN_CLUSTER_ID") {
            if let Ok(parsed) = id.parse::<u64>() {
                config.cdn_cluster_id = parsed;
            }
        }

        config
    }
}

/// Manager connection settings
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Etcd endpoints holding the manager's records (env: ETCD_ENDPOINTS, comma-separated)
    pub etcd_endpoints: Vec<String>,

    // Connection retry
    pub etcd_backoff_initial: Duration,
    pub etcd_backoff_max: Duration,
    pub etcd_backoff_max_elapsed: Duration,
    pub etcd_backoff_multiplier: f64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            etcd_endpoints: vec!["http://127.0.0.1:2379".to_string()],
            etcd_backoff_initial: Duration::from_secs(1),
            etcd_backoff_max: Duration::from_secs(10),
            etcd_backoff_max_elapsed: Duration::from_secs(60),
            etcd_backoff_multiplier: 2.0,
        }
    }
}

impl ManagerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(endpoints) = std::env::var("ETCD_ENDPOINTS") {
            config.etcd_endpoints = parse_endpoints(&endpoints);
        }

        config
    }
}

/// Split a comma-separated endpoint list, dropping empty entries.
pub fn parse_endpoints(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Like `env_secs`, but a zero value is treated as unset.
fn env_nonzero_secs(key: &str) -> Option<Duration> {
    env_secs(key).filter(|d| !d.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynconfig_defaults() {
        let config = DynconfigConfig::default();
        assert_eq!(config.refresh_interval, Duration::from_secs(10));
        assert!(config.expire_time >= config.refresh_interval);
        assert!(config.probe_timeout < Duration::from_secs(10));
        assert!(config.probe_concurrency > 0);
    }

    #[test]
    fn test_host_defaults() {
        let config = HostConfig::default();
        assert!(config.hostname.starts_with("seedmesh-"));
        assert_eq!(config.advertise_ip, "127.0.0.1");
    }

    #[test]
    fn test_parse_endpoints() {
        let endpoints = parse_endpoints("http://etcd-0:2379, http://etcd-1:2379,,");
        assert_eq!(endpoints, vec!["http://etcd-0:2379", "http://etcd-1:2379"]);
    }

    #[test]
    fn test_zero_env_secs_is_ignored() {
        let key = "SEEDMESH_TEST_ZERO_INTERVAL_SECS";
        std::env::set_var(key, "0");
        assert_eq!(env_secs(key), Some(Duration::ZERO));
        assert_eq!(env_nonzero_secs(key), None);

        std::env::set_var(key, "5");
        assert_eq!(env_nonzero_secs(key), Some(Duration::from_secs(5)));
        std::env::remove_var(key);
    }
}
