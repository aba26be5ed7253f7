// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use commit_relay_core::config::DEFAULT_COMMIT_BUCKET;
use commit_relay_core::storage::{EventStore, MemoryStore};
use commit_relay_node::config::{RelayConfig, StoreKind};
use commit_relay_node::network::{AwServerStore, SyncClient};
use commit_relay_node::relay::{Relay, SharedRelay};
use commit_relay_node::scheduler::SyncScheduler;
use commit_relay_node::server::build_router;
use commit_relay_node::sink::{ErrorSink, FileErrorSink};
use commit_relay_node::telemetry::init_telemetry;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "commit-relay")]
#[command(about = "Buffers git commit notifications and syncs them to a remote aggregation endpoint", long_about = None)]
struct Cli {
    /// Address the HTTP listener binds to.
    #[arg(long, env = "COMMIT_RELAY_BIND_ADDR", default_value = "0.0.0.0:5000")]
    bind_addr: SocketAddr,

    /// Endpoint buffered commits are POSTed to.
    #[arg(long, env = "COMMIT_RELAY_REMOTE_URL")]
    remote_url: String,

    #[arg(long, env = "COMMIT_RELAY_FLUSH_INTERVAL_SECS", default_value_t = 1800)]
    flush_interval_secs: u64,

    /// Timeout for one sync request.
    #[arg(long, env = "COMMIT_RELAY_SYNC_TIMEOUT_SECS", default_value_t = 30)]
    sync_timeout_secs: u64,

    /// Enable exponential backoff between failed flushes, capped at this many seconds.
    #[arg(long, env = "COMMIT_RELAY_BACKOFF_CAP_SECS")]
    backoff_cap_secs: Option<u64>,

    #[arg(long, env = "COMMIT_RELAY_STORE", value_enum, default_value_t = StoreKind::AwServer)]
    store: StoreKind,

    #[arg(long, env = "COMMIT_RELAY_AW_SERVER_URL", default_value = "http://127.0.0.1:5600")]
    aw_server_url: String,

    #[arg(long, env = "COMMIT_RELAY_BUCKET_ID", default_value = DEFAULT_COMMIT_BUCKET)]
    bucket_id: String,

    /// Client name recorded on the commit bucket.
    #[arg(long, env = "COMMIT_RELAY_CLIENT_NAME", default_value = "commit-relay")]
    client_name: String,

    #[arg(long, env = "COMMIT_RELAY_HOSTNAME", default_value = "unknown")]
    hostname: String,

    /// File that failed ingests and syncs are appended to.
    #[arg(long, env = "COMMIT_RELAY_ERROR_LOG", default_value = "commit-relay-errors.log")]
    error_log: PathBuf,
}

impl From<Cli> for RelayConfig {
    fn from(cli: Cli) -> Self {
        Self {
            bind_addr: cli.bind_addr,
            remote_url: cli.remote_url,
            flush_interval: Duration::from_secs(cli.flush_interval_secs),
            sync_timeout: Duration::from_secs(cli.sync_timeout_secs),
            backoff_cap: cli.backoff_cap_secs.map(Duration::from_secs),
            store: cli.store,
            aw_server_url: cli.aw_server_url,
            bucket_id: cli.bucket_id,
            client_name: cli.client_name,
            hostname: cli.hostname,
            error_log_path: cli.error_log,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry()?;

    let cfg = RelayConfig::from(Cli::parse());
    cfg.validate()?;

    tracing::info!("Initializing commit relay with config: {:?}", cfg);

    let sink = Arc::new(FileErrorSink::new(&cfg.error_log_path));
    let sync_client = SyncClient::new(cfg.remote_url.clone(), cfg.sync_timeout)?;

    match cfg.store {
        StoreKind::AwServer => {
            let store = AwServerStore::new(&cfg.aw_server_url, cfg.client_name.clone(), cfg.hostname.clone(), cfg.sync_timeout)?;
            run(cfg, Arc::new(store), sink, sync_client).await
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store: buffered commits do not survive a restart");
            run(cfg, Arc::new(MemoryStore::new()), sink, sync_client).await
        }
    }
}

async fn run<S: EventStore, K: ErrorSink>(
    cfg: RelayConfig,
    store: Arc<S>,
    sink: Arc<K>,
    sync_client: SyncClient,
) -> anyhow::Result<()> {
    let relay: SharedRelay<S, K> = Arc::new(Relay::new(store, sink, sync_client, cfg.bucket_id.clone()));
    relay.ensure_bucket().await?;

    let shutdown = CancellationToken::new();

    // Spawn Sync Task
    let scheduler = SyncScheduler::new(relay.clone(), cfg.flush_interval, cfg.retry_policy(), shutdown.clone()).spawn();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                signal_token.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    let app = build_router(relay);

    tracing::info!("Listening on {}", cfg.bind_addr);
    let listener = TcpListener::bind(cfg.bind_addr).await?;
    let server_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_token.cancelled().await })
        .await?;

    // Let an in-flight flush finish before exiting.
    shutdown.cancel();
    scheduler.await?;
    tracing::info!("Commit relay stopped");
    Ok(())
}
