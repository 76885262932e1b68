//! Seed peer address watcher
//!
//! Re-resolves seed peers whenever the scheduler dynconfig is pushed and
//! publishes the reachable addresses on a watch channel.

use super::probe::{GrpcHealthProbe, HealthProbe};
use super::seed_peer::{ResolvedAddress, SeedPeerResolver};
use crate::dynconfig::{Observer, SchedulerDynconfigData};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

pub struct SeedPeerAddrWatcher<P = GrpcHealthProbe> {
    resolver: Arc<SeedPeerResolver<P>>,
    addrs: Arc<watch::Sender<Vec<ResolvedAddress>>>,
    /// Bumped per notification; a resolution only publishes if still latest
    generation: Arc<AtomicU64>,
}

impl<P: HealthProbe + 'static> SeedPeerAddrWatcher<P> {
    pub fn new(resolver: Arc<SeedPeerResolver<P>>) -> Self {
        let (addrs, _) = watch::channel(Vec::new());
        Self {
            resolver,
            addrs: Arc::new(addrs),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<ResolvedAddress>> {
        self.addrs.subscribe()
    }

    /// Last published addresses
    pub fn current(&self) -> Vec<ResolvedAddress> {
        self.addrs.borrow().clone()
    }
}

impl<P: HealthProbe + 'static> Observer<SchedulerDynconfigData> for SeedPeerAddrWatcher<P> {
    /// Spawns the resolution on the current tokio runtime; must be notified
    /// from within one.
    fn on_notify(&self, data: &SchedulerDynconfigData) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let latest = Arc::clone(&self.generation);
        let resolver = Arc::clone(&self.resolver);
        let addrs = Arc::clone(&self.addrs);
        let seed_peers = data.scheduler.seed_peers.clone();

        tokio::spawn(async move {
            let resolved = resolver.resolve(&seed_peers).await;
            if latest.load(Ordering::Acquire) != generation {
                debug!(generation, "Seed peer resolution superseded");
                return;
            }

            match resolved {
                Ok(resolved) => {
                    addrs.send_if_modified(|current| {
                        if *current == resolved {
                            return false;
                        }
                        *current = resolved;
                        true
                    });
                }
                Err(e) => warn!(error = %e, "Seed peer resolution failed, keeping previous addresses"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ProbeError;
    use async_trait::async_trait;
    use seedmesh_core::SeedPeer;
    use std::time::Duration;

    struct PortProbe;

    /// Even ports are alive
    #[async_trait]
    impl HealthProbe for PortProbe {
        async fn check(&self, addr: &str) -> Result<(), ProbeError> {
            let port: u32 = addr.rsplit(':').next().unwrap().parse().unwrap();
            if port % 2 == 0 {
                Ok(())
            } else {
                Err(ProbeError::NotServing("NOT_SERVING"))
            }
        }
    }

    fn payload(ports: &[i32]) -> SchedulerDynconfigData {
        let mut data = SchedulerDynconfigData::default();
        data.scheduler.seed_peers = ports
            .iter()
            .map(|port| SeedPeer {
                ip: "10.0.0.1".to_string(),
                port: *port,
                ..Default::default()
            })
            .collect();
        data
    }

    #[tokio::test]
    async fn test_publishes_resolved_addresses() {
        let watcher = SeedPeerAddrWatcher::new(Arc::new(SeedPeerResolver::with_probe(PortProbe, 2)));
        let mut rx = watcher.subscribe();

        watcher.on_notify(&payload(&[8000, 8001, 8002]));
        tokio::time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .unwrap()
            .unwrap();

        let addrs: Vec<String> = rx.borrow().iter().map(|a| a.addr.clone()).collect();
        assert_eq!(addrs, vec!["10.0.0.1:8000", "10.0.0.1:8002"]);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_addresses() {
        let watcher = SeedPeerAddrWatcher::new(Arc::new(SeedPeerResolver::with_probe(PortProbe, 2)));
        let mut rx = watcher.subscribe();

        watcher.on_notify(&payload(&[8000]));
        rx.changed().await.unwrap();

        watcher.on_notify(&payload(&[8001]));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!rx.has_changed().unwrap());
        assert_eq!(watcher.current()[0].addr, "10.0.0.1:8000");
    }
}
