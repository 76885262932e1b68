//! Structured Events
//!
//! Named events with consistent field names. Every event carries an
//! `event_type` field so log pipelines can filter on it.
//!
//! Event types:
//! - `dynconfig_cache_loaded` - store seeded from a fresh cache file
//! - `dynconfig_refreshed` - successful refresh and fan-out
//! - `dynconfig_refresh_failed` - background refresh failed, previous data kept
//! - `seed_peer_unreachable` - a seed peer failed its health probe
//! - `seed_peers_resolved` - resolution finished with reachable addresses
//! - `topology_updated` - role payload pushed to observers

use std::time::Duration;
use tracing::{debug, info, warn};

pub fn dynconfig_cache_loaded(path: &str, age_secs: u64) {
    info!(
        event_type = "dynconfig_cache_loaded",
        path = %path,
        age_secs = age_secs,
        "Dynconfig loaded from cache"
    );
}

pub fn dynconfig_refreshed(path: &str, observers: usize, duration: Duration) {
    debug!(
        event_type = "dynconfig_refreshed",
        path = %path,
        observers = observers,
        duration_ms = duration.as_millis() as u64,
        "Dynconfig refreshed"
    );
}

pub fn dynconfig_refresh_failed(path: &str, error: &str) {
    warn!(
        event_type = "dynconfig_refresh_failed",
        path = %path,
        error = %error,
        "Dynconfig refresh failed, keeping previous data"
    );
}

pub fn seed_peer_unreachable(addr: &str, error: &str) {
    warn!(
        event_type = "seed_peer_unreachable",
        addr = %addr,
        error = %error,
        "Seed peer health check failed"
    );
}

pub fn seed_peers_resolved(candidates: usize, resolved: usize) {
    debug!(
        event_type = "seed_peers_resolved",
        candidates = candidates,
        resolved = resolved,
        "Seed peer addresses resolved"
    );
}

/// Emit a topology updated event
pub fn topology_updated(role: &str, entries: usize) {
    info!(
        event_type = "topology_updated",
        role = %role,
        entries = entries,
        "Topology updated"
    );
}
