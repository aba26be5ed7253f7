// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! The relay service object.
//!
//! One [`Relay`] is built at startup and shared (as [`SharedRelay`]) by the
//! HTTP handlers and the sync scheduler. It owns the only handle to the
//! commit bucket, wrapped in a tokio mutex: append, list and delete on the
//! commit bucket are reachable only through [`CommitBucket`], so ingest and
//! flush critical sections can never interleave.

use std::sync::Arc;

use commit_relay_core::collector::SnapshotCollector;
use commit_relay_core::config::COMMIT_EVENT_TYPE;
use commit_relay_core::error::StoreResult;
use commit_relay_core::event::Event;
use commit_relay_core::storage::EventStore;
use commit_relay_core::types::EventId;
use tokio::sync::{Mutex, MutexGuard};

use crate::network::SyncClient;
use crate::sink::{ErrorEntry, ErrorSink};

pub type SharedRelay<S, K> = Arc<Relay<S, K>>;

/// Exclusive view of the commit bucket.
pub struct CommitBucket<S> {
    store: Arc<S>,
    bucket_id: String,
}

impl<S: EventStore> CommitBucket<S> {
    pub async fn append(&mut self, event: Event) -> StoreResult<EventId> {
        self.store.insert_event(&self.bucket_id, event).await
    }

    /// Everything currently buffered, oldest first.
    pub async fn buffered(&self) -> StoreResult<Vec<Event>> {
        let mut events = self.store.get_events(&self.bucket_id, None).await?;
        events.reverse();
        Ok(events)
    }

    pub async fn remove(&mut self, id: EventId) -> StoreResult<()> {
        self.store.delete_event(&self.bucket_id, id).await
    }
}

pub struct Relay<S, K> {
    store: Arc<S>,
    bucket_id: String,
    bucket: Mutex<CommitBucket<S>>,
    pub(crate) collector: SnapshotCollector<S>,
    sink: Arc<K>,
    sync_client: SyncClient,
}

impl<S: EventStore, K: ErrorSink> Relay<S, K> {
    pub fn new(store: Arc<S>, sink: Arc<K>, sync_client: SyncClient, bucket_id: impl Into<String>) -> Self {
        let bucket_id = bucket_id.into();
        Self {
            bucket: Mutex::new(CommitBucket {
                store: store.clone(),
                bucket_id: bucket_id.clone(),
            }),
            collector: SnapshotCollector::new(store.clone(), bucket_id.clone()),
            store,
            bucket_id,
            sink,
            sync_client,
        }
    }

    pub fn sink(&self) -> &Arc<K> {
        &self.sink
    }

    pub fn sync_client(&self) -> &SyncClient {
        &self.sync_client
    }

    /// Creates the commit bucket if the store does not have it yet.
    pub async fn ensure_bucket(&self) -> StoreResult<()> {
        self.store.create_bucket(&self.bucket_id, COMMIT_EVENT_TYPE).await?;
        tracing::info!("Commit bucket {} ready", self.bucket_id);
        Ok(())
    }

    /// Exclusive access to the commit bucket until the guard is dropped.
    pub async fn lock_bucket(&self) -> MutexGuard<'_, CommitBucket<S>> {
        self.bucket.lock().await
    }

    /// Number of buffered commits, read under the bucket lock.
    pub async fn buffered_len(&self) -> StoreResult<usize> {
        let bucket = self.lock_bucket().await;
        let events = bucket.buffered().await?;
        Ok(events.len())
    }

    /// Writes to the error sink. A failing sink is logged, never propagated.
    pub(crate) async fn report(&self, entry: ErrorEntry) {
        if let Err(e) = self.sink.append(entry).await {
            tracing::warn!("Error sink unavailable: {}", e);
        }
    }
}
