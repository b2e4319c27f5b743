//! # Alibaba Cloud Provider
//!
//! Kubernetes controllers that reconcile Alibaba Cloud resources from
//! cluster-scoped custom resources, in the managed-resource model: each
//! object names a ProviderConfig, its cloud identifier lives in the
//! `crossplane.io/external-name` annotation, and connection details are
//! written to the Secret named by `writeConnectionSecretToRef`.
//!
//! ## Kinds
//!
//! - `database.alibaba.crossplane.io`: RDSInstance
//! - `redis.alibaba.crossplane.io`: RedisInstance
//! - `oss.alibaba.crossplane.io`: Bucket
//! - `slb.alibaba.crossplane.io`: CLB
//! - `nas.alibaba.crossplane.io`: NASFileSystem, NASMountTarget
//! - `sls.alibaba.crossplane.io`: Project, Store, StoreIndex, MachineGroup, Logtail
//!
//! ## Usage
//!
//! ```bash
//! alibaba-provider --kinds RDSInstance,Bucket --poll-interval 120
//! ```

use alibaba_provider::config::{ControllerConfig, LogFormat};
use alibaba_provider::controller::provider_config::run_provider_config_controller;
use alibaba_provider::controller::registry::{ControllerDeps, KindRegistry};
use alibaba_provider::controller::server::{start_server, ServerState};
use alibaba_provider::controller::usage::KubeUsageTracker;
use alibaba_provider::observability;
use alibaba_provider::provider::KubeConfigStore;
use anyhow::{Context, Result};
use clap::Parser;
use kube::Client;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Alibaba Cloud provider controllers
#[derive(Debug, Parser)]
#[command(name = "alibaba-provider", version, about, long_about = None)]
struct Cli {
    /// Port for `/metrics`, `/healthz` and `/readyz`
    #[arg(long, env = "METRICS_PORT")]
    metrics_port: Option<u16>,

    /// Kinds to run, comma separated; all kinds when empty
    #[arg(long, env = "KINDS", value_delimiter = ',')]
    kinds: Vec<String>,

    /// Seconds between observations of a healthy resource
    #[arg(long, env = "POLL_INTERVAL_SECS")]
    poll_interval: Option<u64>,
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "alibaba_provider=info,alibaba_provider_controller=info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Required for rustls 0.23+ when no default provider is set via features
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        anyhow::bail!("Failed to install rustls crypto provider");
    }

    let cli = Cli::parse();
    let mut config = ControllerConfig::from_env();
    if let Some(port) = cli.metrics_port {
        config.metrics_port = port;
    }
    if let Some(secs) = cli.poll_interval {
        config.poll_interval_secs = secs;
    }

    init_tracing(config.log_format);
    info!("Starting Alibaba Cloud provider");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    observability::register_metrics().context("Failed to register metrics")?;

    let registry = KindRegistry::builtin();
    let selected = registry.select(&cli.kinds)?;

    let server_state = Arc::new(ServerState::ready());
    let server_port = config.metrics_port;
    let server_state_for_server = Arc::clone(&server_state);
    tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_for_server).await {
            error!("HTTP server error: {}", e);
        }
    });

    let shutdown_state = Arc::clone(&server_state);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal (SIGINT/SIGTERM), initiating graceful shutdown...");
            shutdown_state.mark_not_ready();
        }
    });

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let deps = ControllerDeps {
        client: client.clone(),
        config,
        usage: Arc::new(KubeUsageTracker::new(client.clone())),
        store: Arc::new(KubeConfigStore::new(client)),
        server_state,
    };

    let mut controllers = JoinSet::new();
    info!("Starting ProviderConfig controller");
    controllers.spawn(run_provider_config_controller(deps.clone()));
    for kind in selected {
        info!(resource.kind = kind.kind, group = kind.group, "Starting controller");
        controllers.spawn((kind.run)(deps.clone()));
    }

    while let Some(result) = controllers.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Controller failed: {:#}", e),
            Err(e) => error!("Controller task panicked: {}", e),
        }
    }

    info!("All controllers stopped");
    Ok(())
}
