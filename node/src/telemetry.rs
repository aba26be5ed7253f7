// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize telemetry (logs + metrics)
pub fn init_telemetry() -> Result<(), BuildError> {
    // 1. Logs
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "commit_relay_node=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Metrics (Prometheus)
    let handle = PrometheusBuilder::new().install_recorder()?;
    if PROM_HANDLE.set(handle).is_err() {
        tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
    }

    metrics::describe_counter!("commit_relay_commits_ingested_total", "Commits appended to the sync buffer");
    metrics::describe_counter!("commit_relay_ingest_failures_total", "Commit notifications rejected with an internal error");
    metrics::describe_counter!("commit_relay_flush_events_sent_total", "Buffered commits acknowledged by the remote endpoint");
    metrics::describe_counter!("commit_relay_flush_failures_total", "Flushes whose batch was not acknowledged");
    metrics::describe_histogram!("commit_relay_flush_duration_seconds", "Time taken by a successful flush");
    metrics::describe_gauge!("commit_relay_buffered_events", "Commits left in the buffer after the last flush");

    metrics::gauge!("commit_relay_up", 1.0);
    Ok(())
}

/// Get the Prometheus handle to render metrics
pub fn get_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}
