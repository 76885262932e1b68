//! Core shared types and utilities for seedmesh
//!
//! This crate contains the manager model types, cluster config schemas and
//! address helpers shared by the scheduler and CDN dynconfig stores.

pub mod blob;
pub mod cluster;
pub mod models;
pub mod net;

pub use cluster::{
    HostType, SchedulerClusterClientConfig, SchedulerClusterConfig, SeedPeerClusterConfig,
};
pub use models::{
    Application, ApplicationPriority, Cdn, CdnSchedulerCluster, Scheduler, SchedulerCluster,
    SchedulerInstance, SeedPeer, SeedPeerCluster, SourceType, UrlPriority,
};
