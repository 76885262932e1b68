//! Dynamic Configuration
//!
//! Fetches the node's view of the cluster from the manager, keeps the
//! last-known-good payload in memory and on disk, refreshes it in the
//! background and pushes every refresh to registered observers.
//!
//! - `store`: the generic [`Dynconfig`] store and its serve/stop lifecycle
//! - `cache`: the on-disk cache file
//! - `observer`: observer trait and registry
//! - `scheduler` / `cdn`: role payloads and typed getters

mod cache;
mod cdn;
mod error;
mod observer;
mod scheduler;
mod store;

pub use cache::{CacheEntry, CacheFile};
pub use cdn::{CdnDynconfig, CdnDynconfigData, CDN_CACHE_FILE_NAME};
pub use error::{Error, Result};
pub use observer::{Observer, ObserverRegistry};
pub use scheduler::{
    seed_peer_cluster_config, SchedulerDynconfig, SchedulerDynconfigData,
    SCHEDULER_CACHE_FILE_NAME,
};
pub use store::{Dynconfig, DynconfigData, DynconfigSource, DynconfigState};
