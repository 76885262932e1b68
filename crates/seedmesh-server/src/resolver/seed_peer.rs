//! Seed Peer Resolver

use super::probe::{GrpcHealthProbe, HealthProbe};
use crate::config::DynconfigConfig;
use crate::dynconfig::{Error, Result, SchedulerDynconfigData};
use crate::observability::{events, metrics};
use futures::stream::{FuturesOrdered, StreamExt};
use seedmesh_core::{net, SeedPeer};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;
use tonic::transport::ClientTlsConfig;
use tracing::debug;

/// A seed peer address that passed its health check
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedAddress {
    /// Advertised IP, used as the TLS server name
    pub server_name: String,
    /// `ip:port`, IPv6 bracketed
    pub addr: String,
}

pub struct SeedPeerResolver<P = GrpcHealthProbe> {
    probe: P,
    concurrency: usize,
}

impl SeedPeerResolver<GrpcHealthProbe> {
    pub fn new(config: &DynconfigConfig, tls: Option<ClientTlsConfig>) -> Self {
        Self::with_probe(
            GrpcHealthProbe::new(tls, config.probe_timeout),
            config.probe_concurrency,
        )
    }
}

impl<P: HealthProbe> SeedPeerResolver<P> {
    pub fn with_probe(probe: P, concurrency: usize) -> Self {
        Self {
            probe,
            concurrency: concurrency.max(1),
        }
    }

    /// Probe every seed peer and return the reachable addresses in list
    /// order, first occurrence of an address winning.
    ///
    /// Peers with an unparseable IP are skipped without probing. Fails with
    /// [`Error::NoReachablePeers`] when nothing answered.
    pub async fn resolve(&self, seed_peers: &[SeedPeer]) -> Result<Vec<ResolvedAddress>> {
        let candidates: Vec<(&SeedPeer, String)> = seed_peers
            .iter()
            .filter_map(|seed_peer| match net::dial_addr(&seed_peer.ip, seed_peer.port) {
                Some(addr) => Some((seed_peer, addr)),
                None => {
                    debug!(
                        host_name = %seed_peer.host_name,
                        ip = %seed_peer.ip,
                        "Skipping seed peer with malformed ip"
                    );
                    None
                }
            })
            .collect();
        let candidate_count = candidates.len();

        // Bounded concurrency; FuturesOrdered yields in input order so dedup
        // below sees list order
        let mut pending = candidates.into_iter();
        let mut in_flight = FuturesOrdered::new();
        let mut probed = Vec::with_capacity(candidate_count);
        loop {
            while in_flight.len() < self.concurrency {
                match pending.next() {
                    Some((seed_peer, addr)) => {
                        in_flight.push_back(self.probe_candidate(seed_peer, addr))
                    }
                    None => break,
                }
            }
            match in_flight.next().await {
                Some(outcome) => probed.push(outcome),
                None => break,
            }
        }

        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        for (seed_peer, addr, reachable) in probed {
            if !reachable || !seen.insert(addr.clone()) {
                continue;
            }
            resolved.push(ResolvedAddress {
                server_name: seed_peer.ip.clone(),
                addr,
            });
        }

        metrics::set_resolved_seed_peers(resolved.len());
        events::seed_peers_resolved(candidate_count, resolved.len());

        if resolved.is_empty() {
            return Err(Error::NoReachablePeers);
        }
        Ok(resolved)
    }

    /// Resolve the seed peers embedded in a scheduler payload.
    pub async fn resolve_payload(
        &self,
        data: &SchedulerDynconfigData,
    ) -> Result<Vec<ResolvedAddress>> {
        self.resolve(&data.scheduler.seed_peers).await
    }

    async fn probe_candidate<'a>(
        &self,
        seed_peer: &'a SeedPeer,
        addr: String,
    ) -> (&'a SeedPeer, String, bool) {
        let reachable = self.probe_one(&addr).await;
        (seed_peer, addr, reachable)
    }

    async fn probe_one(&self, addr: &str) -> bool {
        let started = Instant::now();
        match self.probe.check(addr).await {
            Ok(()) => {
                metrics::record_probe("success", started.elapsed());
                true
            }
            Err(e) => {
                metrics::record_probe("failure", started.elapsed());
                events::seed_peer_unreachable(addr, &e.to_string());
                false
            }
        }
    }
}
