//! Observability Module
//!
//! - `metrics`: Prometheus metrics for dynconfig refreshes and seed peer probes
//! - `events`: Structured event logging with consistent fields
//! - `tracing`: Subscriber setup with optional OpenTelemetry export

pub mod events;
pub mod metrics;
pub mod tracing;

pub use metrics::{init_metrics, MetricsState};
pub use tracing::{init_tracing, shutdown_tracing, TracingConfig};
