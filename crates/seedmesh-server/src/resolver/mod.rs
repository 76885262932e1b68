//! Seed Peer Resolution
//!
//! Turns the seed peers advertised in the scheduler dynconfig into a
//! deduplicated list of addresses that answered a gRPC health check.

mod probe;
mod seed_peer;
mod watcher;

pub use probe::{GrpcHealthProbe, HealthProbe, ProbeError};
pub use seed_peer::{ResolvedAddress, SeedPeerResolver};
pub use watcher::SeedPeerAddrWatcher;
