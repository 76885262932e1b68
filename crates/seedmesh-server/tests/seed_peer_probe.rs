//! Seed peer probing against live gRPC health servers

use seedmesh_core::SeedPeer;
use seedmesh_server::config::DynconfigConfig;
use seedmesh_server::dynconfig::{
    Dynconfig, Error, SchedulerDynconfigData, SCHEDULER_CACHE_FILE_NAME,
};
use seedmesh_server::resolver::{GrpcHealthProbe, HealthProbe, ProbeError, SeedPeerResolver};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic_health::ServingStatus;

async fn spawn_health_server(status: ServingStatus) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (mut reporter, service) = tonic_health::server::health_reporter();
    reporter.set_service_status("", status).await;

    tokio::spawn(async move {
        // Keep the reporter alive with the server
        let _reporter = reporter;
        tonic::transport::Server::builder()
            .add_service(service)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    addr
}

/// An address nothing listens on
async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

fn probe() -> GrpcHealthProbe {
    GrpcHealthProbe::new(None, Duration::from_secs(2))
}

fn seed_peer(addr: SocketAddr) -> SeedPeer {
    SeedPeer {
        host_name: format!("seed-{}", addr.port()),
        ip: addr.ip().to_string(),
        port: i32::from(addr.port()),
        ..Default::default()
    }
}

fn test_config() -> DynconfigConfig {
    DynconfigConfig {
        probe_timeout: Duration::from_secs(2),
        probe_concurrency: 4,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_serving_peer_passes() {
    let addr = spawn_health_server(ServingStatus::Serving).await;
    probe().check(&addr.to_string()).await.unwrap();
}

#[tokio::test]
async fn test_not_serving_peer_fails() {
    let addr = spawn_health_server(ServingStatus::NotServing).await;
    let result = probe().check(&addr.to_string()).await;
    assert!(matches!(result, Err(ProbeError::NotServing("NOT_SERVING"))));
}

#[tokio::test]
async fn test_closed_port_fails() {
    let addr = closed_addr().await;
    let result = probe().check(&addr.to_string()).await;
    assert!(matches!(
        result,
        Err(ProbeError::Connect(_)) | Err(ProbeError::Timeout(_))
    ));
}

#[tokio::test]
async fn test_resolver_keeps_live_peers_in_order() {
    let live = spawn_health_server(ServingStatus::Serving).await;
    let draining = spawn_health_server(ServingStatus::NotServing).await;
    let closed = closed_addr().await;

    let resolver = SeedPeerResolver::new(&test_config(), None);
    let seed_peers = vec![
        seed_peer(closed),
        seed_peer(live),
        seed_peer(draining),
        seed_peer(live),
    ];

    let resolved = resolver.resolve(&seed_peers).await.unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].addr, live.to_string());
    assert_eq!(resolved[0].server_name, "127.0.0.1");
}

#[tokio::test]
async fn test_dynconfig_resolves_seed_peer_addrs() {
    let live = spawn_health_server(ServingStatus::Serving).await;
    let mut data = SchedulerDynconfigData::default();
    data.scheduler.seed_peers = vec![seed_peer(live)];
    let dynconfig = Dynconfig::with_data(data, SCHEDULER_CACHE_FILE_NAME, test_config());
    let resolver = SeedPeerResolver::new(&test_config(), None);

    let resolved = dynconfig.get_resolve_seed_peer_addrs(&resolver).await.unwrap();
    assert_eq!(resolved[0].addr, live.to_string());

    let empty = Dynconfig::with_data(
        SchedulerDynconfigData::default(),
        SCHEDULER_CACHE_FILE_NAME,
        test_config(),
    );
    let result = empty.get_resolve_seed_peer_addrs(&resolver).await;
    assert!(matches!(result, Err(Error::NoReachablePeers)));
}
