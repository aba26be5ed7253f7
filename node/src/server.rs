// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use commit_relay_core::storage::EventStore;
use tower_http::trace::TraceLayer;

use crate::api::{HealthResponse, StatusResponse};
use crate::errors::IngestError;
use crate::relay::SharedRelay;
use crate::sink::ErrorSink;

pub fn build_router<S: EventStore, K: ErrorSink>(relay: SharedRelay<S, K>) -> Router {
    Router::new()
        .route("/git-commit", post(receive_git_commit::<S, K>))
        .route("/health", get(health))
        // Observability
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(relay)
}

// The body is taken raw so that a missing or malformed document is answered
// with the relay's own error shape instead of axum's JSON rejection.
async fn receive_git_commit<S: EventStore, K: ErrorSink>(
    State(relay): State<SharedRelay<S, K>>,
    body: Bytes,
) -> Result<Json<StatusResponse>, IngestError> {
    relay.ingest(&body).await?;
    Ok(Json(StatusResponse::success()))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

async fn metrics_handler() -> String {
    crate::telemetry::get_metrics()
}
