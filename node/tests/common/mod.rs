// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use commit_relay_core::error::{StoreError, StoreResult};
use commit_relay_core::event::{BucketInfo, Event};
use commit_relay_core::storage::{EventStore, MemoryStore};
use commit_relay_core::types::EventId;
use commit_relay_node::network::{SyncClient, BATCH_DIGEST_HEADER};
use commit_relay_node::relay::{Relay, SharedRelay};
use commit_relay_node::sink::MemorySink;
use serde_json::json;
use tokio::net::TcpListener;

pub const COMMIT_BUCKET: &str = "git-commits-bucket";
pub const VANISHED_BUCKET: &str = "aw-watcher-deleted_host";

/// A received batch and the digest header it came with.
#[derive(Debug, Clone)]
pub struct ReceivedBatch {
    pub events: Vec<Event>,
    pub digest: Option<String>,
}

#[derive(Clone, Default)]
struct RemoteState {
    batches: Arc<Mutex<Vec<ReceivedBatch>>>,
    status: Arc<AtomicU16>,
    delay_ms: Arc<AtomicU64>,
}

/// Stand-in for the remote aggregation endpoint.
pub struct FakeRemote {
    pub url: String,
    state: RemoteState,
}

impl FakeRemote {
    pub async fn start() -> Self {
        let state = RemoteState::default();
        state.status.store(200, Ordering::SeqCst);

        let app = Router::new()
            .route("/receive-git-data", post(receive))
            .with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url: format!("http://{}/receive-git-data", addr), state }
    }

    pub fn respond_with(&self, status: u16) {
        self.state.status.store(status, Ordering::SeqCst);
    }

    pub fn delay(&self, delay: Duration) {
        self.state.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn batches(&self) -> Vec<ReceivedBatch> {
        self.state.batches.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.batches.lock().unwrap().len()
    }
}

async fn receive(
    State(state): State<RemoteState>,
    headers: HeaderMap,
    Json(events): Json<Vec<Event>>,
) -> StatusCode {
    let delay = state.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    let digest = headers
        .get(BATCH_DIGEST_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    state.batches.lock().unwrap().push(ReceivedBatch { events, digest });
    StatusCode::from_u16(state.status.load(Ordering::SeqCst)).unwrap()
}

/// [`MemoryStore`] with switchable failures.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_list_buckets: AtomicBool,
    pub fail_get_events: AtomicBool,
    pub fail_inserts: AtomicBool,
    pub fail_deletes: AtomicBool,
    /// Lists [`VANISHED_BUCKET`] without holding it.
    pub list_vanished_bucket: AtomicBool,
}

impl FlakyStore {
    fn refuse(flag: &AtomicBool, op: &str) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("{} refused", op)));
        }
        Ok(())
    }
}

impl EventStore for FlakyStore {
    async fn create_bucket(&self, bucket_id: &str, event_type: &str) -> StoreResult<()> {
        self.inner.create_bucket(bucket_id, event_type).await
    }

    async fn list_buckets(&self) -> StoreResult<Vec<BucketInfo>> {
        Self::refuse(&self.fail_list_buckets, "list_buckets")?;
        let mut buckets = self.inner.list_buckets().await?;
        if self.list_vanished_bucket.load(Ordering::SeqCst) {
            buckets.push(BucketInfo::new(VANISHED_BUCKET, "currentwindow"));
        }
        Ok(buckets)
    }

    async fn get_events(&self, bucket_id: &str, limit: Option<usize>) -> StoreResult<Vec<Event>> {
        Self::refuse(&self.fail_get_events, "get_events")?;
        self.inner.get_events(bucket_id, limit).await
    }

    async fn insert_event(&self, bucket_id: &str, event: Event) -> StoreResult<EventId> {
        Self::refuse(&self.fail_inserts, "insert_event")?;
        self.inner.insert_event(bucket_id, event).await
    }

    async fn delete_event(&self, bucket_id: &str, id: EventId) -> StoreResult<()> {
        Self::refuse(&self.fail_deletes, "delete_event")?;
        self.inner.delete_event(bucket_id, id).await
    }
}

/// Relay over `store` flushing to `remote_url`, commit bucket created.
pub async fn relay_with<S: EventStore>(store: Arc<S>, remote_url: &str) -> SharedRelay<S, MemorySink> {
    let client = SyncClient::new(remote_url, Duration::from_secs(5)).unwrap();
    let relay = Arc::new(Relay::new(store, Arc::new(MemorySink::new()), client, COMMIT_BUCKET));
    relay.ensure_bucket().await.unwrap();
    relay
}

pub fn commit_body(hash: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "commit_hash": hash,
        "commit_message": format!("commit {}", hash),
        "author": "alice",
        "timestamp": 1700000000
    }))
    .unwrap()
}

/// Adds a watcher bucket holding a single event.
pub async fn add_watcher<S: EventStore>(store: &S, bucket_id: &str, data: serde_json::Value) {
    store.create_bucket(bucket_id, "currentwindow").await.unwrap();
    let event = Event::new(Utc.timestamp_opt(1699999990, 0).unwrap(), 5.0, data);
    store.insert_event(bucket_id, event).await.unwrap();
}

pub fn commit_hashes(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .map(|e| e.data["git_commit"]["commit_hash"].as_str().unwrap().to_string())
        .collect()
}
