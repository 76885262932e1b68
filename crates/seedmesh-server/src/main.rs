//! Seedmesh Server
//!
//! Keeps a scheduler or CDN node's dynconfig in sync with the manager and
//! serves it over the ops API.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use seedmesh_server::api::{self, AppState, RoleDynconfig};
use seedmesh_server::config::{parse_endpoints, DynconfigConfig, HostConfig, ManagerConfig};
use seedmesh_server::dynconfig::{
    CdnDynconfigData, Dynconfig, DynconfigData, DynconfigSource, Observer, SchedulerDynconfigData,
    CDN_CACHE_FILE_NAME, SCHEDULER_CACHE_FILE_NAME,
};
use seedmesh_server::manager::{
    CdnManagerSource, EtcdManagerClient, ManagerClient, SchedulerManagerSource,
};
use seedmesh_server::observability::{
    events, init_metrics, init_tracing, shutdown_tracing, TracingConfig,
};
use seedmesh_server::resolver::{SeedPeerAddrWatcher, SeedPeerResolver};
use seedmesh_server::version;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tonic::transport::{Certificate, ClientTlsConfig};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "seedmesh-server")]
#[command(about = "Dynamic configuration and seed peer discovery daemon")]
#[command(version = version::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print build information
    BuildInfo,
    /// Run the daemon
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Node role
    #[arg(long, env = "SEEDMESH_ROLE", value_enum, default_value_t = Role::Scheduler)]
    role: Role,

    /// etcd endpoints holding manager records (comma-separated)
    #[arg(long, env = "ETCD_ENDPOINTS", default_value = "http://127.0.0.1:2379")]
    etcd_endpoints: String,

    /// Ops API bind address
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: String,

    /// CA certificate (PEM) for probing seed peers over TLS
    #[arg(long, env = "SEED_PEER_TLS_CA")]
    seed_peer_tls_ca: Option<PathBuf>,

    /// Server name to verify seed peer certificates against
    #[arg(long, env = "SEED_PEER_TLS_DOMAIN", requires = "seed_peer_tls_ca")]
    seed_peer_tls_domain: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Role {
    Scheduler,
    Cdn,
}

/// Logs every pushed payload
struct TopologyLogger;

impl Observer<SchedulerDynconfigData> for TopologyLogger {
    fn on_notify(&self, data: &SchedulerDynconfigData) {
        events::topology_updated("scheduler", data.scheduler.seed_peers.len());
    }
}

impl Observer<CdnDynconfigData> for TopologyLogger {
    fn on_notify(&self, data: &CdnDynconfigData) {
        events::topology_updated("cdn", data.schedulers.len());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::BuildInfo => {
            println!("{}", version::build_info());
            Ok(())
        }
        Commands::Run(args) => {
            init_tracing(TracingConfig::from_env())
                .map_err(|e| anyhow::anyhow!(e))
                .context("Failed to initialize tracing")?;
            let result = run(args).await;
            shutdown_tracing();
            result
        }
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let host = HostConfig::from_env();
    let dynconfig_config = DynconfigConfig::from_env();
    let manager_config = ManagerConfig {
        etcd_endpoints: parse_endpoints(&args.etcd_endpoints),
        ..ManagerConfig::from_env()
    };

    info!(
        version = %version::full_version(),
        hostname = %host.hostname,
        etcd_endpoints = ?manager_config.etcd_endpoints,
        bind_addr = %args.bind_addr,
        "Starting seedmesh server"
    );

    let metrics_state = match init_metrics() {
        Ok(state) => Some(state),
        Err(e) => {
            warn!(error = %e, "Metrics disabled");
            None
        }
    };

    let manager: Arc<dyn ManagerClient> = Arc::new(
        EtcdManagerClient::connect(&manager_config)
            .await
            .context("Failed to connect to manager")?,
    );

    let logger = Arc::new(TopologyLogger);
    let readiness = Arc::new(AtomicBool::new(false));
    let mut state = AppState {
        node_id: host.hostname.clone(),
        dynconfig: match args.role {
            Role::Scheduler => {
                let source: Arc<dyn DynconfigSource<SchedulerDynconfigData>> =
                    Arc::new(SchedulerManagerSource::new(manager, host));
                let dynconfig = Dynconfig::new(
                    Some(source),
                    SCHEDULER_CACHE_FILE_NAME,
                    dynconfig_config.clone(),
                )
                .await
                .context("Failed to load scheduler dynconfig")?;
                RoleDynconfig::Scheduler(Arc::new(dynconfig))
            }
            Role::Cdn => {
                let source: Arc<dyn DynconfigSource<CdnDynconfigData>> =
                    Arc::new(CdnManagerSource::new(manager, host));
                let dynconfig = Dynconfig::new(
                    Some(source),
                    CDN_CACHE_FILE_NAME,
                    dynconfig_config.clone(),
                )
                .await
                .context("Failed to load cdn dynconfig")?;
                RoleDynconfig::Cdn(Arc::new(dynconfig))
            }
        },
        seed_peer_addrs: None,
        readiness: readiness.clone(),
        metrics_state,
    };

    // Held until shutdown; the registry only keeps weak references
    let _watcher = match &state.dynconfig {
        RoleDynconfig::Scheduler(dynconfig) => {
            let tls = load_seed_peer_tls(&args).await?;
            let resolver = Arc::new(SeedPeerResolver::new(&dynconfig_config, tls));
            let watcher = Arc::new(SeedPeerAddrWatcher::new(resolver));
            state.seed_peer_addrs = Some(watcher.subscribe());

            dynconfig.register(&logger).await;
            dynconfig.register(&watcher).await;
            serve(dynconfig).await?;
            Some(watcher)
        }
        RoleDynconfig::Cdn(dynconfig) => {
            dynconfig.register(&logger).await;
            serve(dynconfig).await?;
            None
        }
    };
    readiness.store(true, Ordering::Release);

    let app = api::create_router(state.clone());
    let listener = tokio::net::TcpListener::bind(&args.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind_addr))?;
    info!(bind_addr = %args.bind_addr, "Starting API server");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed");

    readiness.store(false, Ordering::Release);
    let stopped = match &state.dynconfig {
        RoleDynconfig::Scheduler(dynconfig) => dynconfig.stop().await,
        RoleDynconfig::Cdn(dynconfig) => dynconfig.stop().await,
    };
    if let Err(e) = stopped {
        warn!(error = %e, "Failed to stop dynconfig cleanly");
    }

    info!("Seedmesh server stopped");
    served
}

/// Start background refresh. Failing to publish the initial payload is fatal.
async fn serve<T: DynconfigData>(dynconfig: &Arc<Dynconfig<T>>) -> anyhow::Result<()> {
    dynconfig
        .serve()
        .await
        .context("Failed to start dynconfig refresh")
}

async fn load_seed_peer_tls(args: &RunArgs) -> anyhow::Result<Option<ClientTlsConfig>> {
    let Some(path) = &args.seed_peer_tls_ca else {
        return Ok(None);
    };

    let pem = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read seed peer CA {}", path.display()))?;
    let mut tls = ClientTlsConfig::new().ca_certificate(Certificate::from_pem(pem));
    if let Some(domain) = &args.seed_peer_tls_domain {
        tls = tls.domain_name(domain.clone());
    }

    Ok(Some(tls))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
