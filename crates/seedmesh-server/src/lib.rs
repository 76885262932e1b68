//! Seedmesh Server Library
//!
//! Dynamic configuration and seed peer discovery for scheduler and CDN nodes

pub mod api;
pub mod config;
pub mod dynconfig;
pub mod manager;
pub mod observability;
pub mod resolver;
pub mod version;
