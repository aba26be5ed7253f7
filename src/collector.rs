// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Watcher snapshot collection.
//!
//! Each ingested commit is enriched with the most recent event of every
//! other bucket in the store (window, AFK, editor watchers and so on).
//! Collection is a pure read and deliberately takes no lock: a snapshot may
//! trail the true latest event of a source bucket by one write.

use std::sync::Arc;

use crate::config::SNAPSHOT_EVENT_LIMIT;
use crate::error::{StoreError, StoreResult};
use crate::event::SnapshotMap;
use crate::storage::EventStore;

pub struct SnapshotCollector<S> {
    store: Arc<S>,
    commit_bucket: String,
}

impl<S: EventStore> SnapshotCollector<S> {
    pub fn new(store: Arc<S>, commit_bucket: impl Into<String>) -> Self {
        Self { store, commit_bucket: commit_bucket.into() }
    }

    /// Latest payload of every bucket except the commit bucket.
    ///
    /// Buckets without events are left out of the map, as are buckets that
    /// disappear between listing and reading.
    pub async fn collect(&self) -> StoreResult<SnapshotMap> {
        let buckets = self.store.list_buckets().await?;
        let mut snapshot = SnapshotMap::new();

        for bucket in buckets {
            if bucket.id == self.commit_bucket {
                continue;
            }
            let latest = match self.store.get_events(&bucket.id, Some(SNAPSHOT_EVENT_LIMIT)).await {
                Ok(latest) => latest,
                Err(StoreError::BucketNotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            if let Some(event) = latest.into_iter().next() {
                snapshot.insert(bucket.id, event.data);
            }
        }

        Ok(snapshot)
    }
}
