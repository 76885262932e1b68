//! Prometheus Metrics
//!
//! Defines and initializes all Prometheus metrics for the seedmesh server.
//!
//! Metrics tracked:
//! - `seedmesh_dynconfig_refresh_total` - counter of refreshes by result
//! - `seedmesh_dynconfig_refresh_duration_seconds` - histogram of fetch + persist times
//! - `seedmesh_dynconfig_notify_total` - counter of observer fan-outs
//! - `seedmesh_dynconfig_observers` - gauge of registered observers
//! - `seedmesh_seed_peer_probe_total` - counter of seed peer health probes by result
//! - `seedmesh_seed_peer_probe_duration_seconds` - histogram of probe latencies
//! - `seedmesh_resolved_seed_peers` - gauge of reachable seed peer addresses

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// State containing the Prometheus handle for metrics export
#[derive(Clone)]
pub struct MetricsState {
    pub prometheus_handle: PrometheusHandle,
}

/// Install the Prometheus recorder and register metric descriptions.
pub fn init_metrics() -> Result<MetricsState, Box<dyn std::error::Error + Send + Sync>> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_metric_descriptions();

    Ok(MetricsState {
        prometheus_handle: handle,
    })
}

fn register_metric_descriptions() {
    // Dynconfig metrics
    describe_counter!(
        "seedmesh_dynconfig_refresh_total",
        "Total number of dynconfig refreshes by result"
    );
    describe_histogram!(
        "seedmesh_dynconfig_refresh_duration_seconds",
        "Duration of dynconfig fetch and persist in seconds"
    );
    describe_counter!(
        "seedmesh_dynconfig_notify_total",
        "Total number of dynconfig observer fan-outs"
    );
    describe_gauge!(
        "seedmesh_dynconfig_observers",
        "Number of registered dynconfig observers"
    );

    // Seed peer metrics
    describe_counter!(
        "seedmesh_seed_peer_probe_total",
        "Total number of seed peer health probes by result"
    );
    describe_histogram!(
        "seedmesh_seed_peer_probe_duration_seconds",
        "Duration of seed peer health probes in seconds"
    );
    describe_gauge!(
        "seedmesh_resolved_seed_peers",
        "Number of reachable seed peer addresses from the last resolution"
    );
}

/// Record a dynconfig refresh. `result` is `success` or `failure`.
pub fn record_refresh(result: &'static str, duration: Duration) {
    counter!("seedmesh_dynconfig_refresh_total", "result" => result).increment(1);
    histogram!("seedmesh_dynconfig_refresh_duration_seconds").record(duration.as_secs_f64());
}

/// Record an observer fan-out
pub fn record_notify(observers: usize) {
    counter!("seedmesh_dynconfig_notify_total").increment(1);
    set_observer_count(observers);
}

pub fn set_observer_count(count: usize) {
    gauge!("seedmesh_dynconfig_observers").set(count as f64);
}

/// Record a seed peer probe. `result` is `success` or `failure`.
pub fn record_probe(result: &'static str, duration: Duration) {
    counter!("seedmesh_seed_peer_probe_total", "result" => result).increment(1);
    histogram!("seedmesh_seed_peer_probe_duration_seconds").record(duration.as_secs_f64());
}

pub fn set_resolved_seed_peers(count: usize) {
    gauge!("seedmesh_resolved_seed_peers").set(count as f64);
}
