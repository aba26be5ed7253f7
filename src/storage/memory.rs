// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! In-process [`EventStore`] used by tests and `--store memory`.

use std::sync::{Mutex, MutexGuard};

use rustc_hash::FxHashMap;

use crate::error::{StoreError, StoreResult};
use crate::event::{BucketInfo, Event};
use crate::storage::EventStore;
use crate::types::EventId;

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    buckets: FxHashMap<String, MemoryBucket>,
    next_id: EventId,
}

struct MemoryBucket {
    info: BucketInfo,
    // Insertion order.
    events: Vec<Event>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events currently held by `bucket_id` (0 for unknown buckets).
    pub fn bucket_len(&self, bucket_id: &str) -> usize {
        self.state()
            .map(|state| state.buckets.get(bucket_id).map_or(0, |b| b.events.len()))
            .unwrap_or(0)
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }
}

impl EventStore for MemoryStore {
    async fn create_bucket(&self, bucket_id: &str, event_type: &str) -> StoreResult<()> {
        let mut state = self.state()?;
        state
            .buckets
            .entry(bucket_id.to_string())
            .or_insert_with(|| MemoryBucket {
                info: BucketInfo::new(bucket_id, event_type),
                events: Vec::new(),
            });
        Ok(())
    }

    async fn list_buckets(&self) -> StoreResult<Vec<BucketInfo>> {
        let state = self.state()?;
        let mut buckets: Vec<BucketInfo> = state.buckets.values().map(|b| b.info.clone()).collect();
        buckets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(buckets)
    }

    async fn get_events(&self, bucket_id: &str, limit: Option<usize>) -> StoreResult<Vec<Event>> {
        let state = self.state()?;
        let bucket = state
            .buckets
            .get(bucket_id)
            .ok_or_else(|| StoreError::BucketNotFound(bucket_id.to_string()))?;

        // Reverse first so the stable sort keeps later inserts ahead on ties.
        let mut events: Vec<Event> = bucket.events.iter().rev().cloned().collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            events.truncate(limit);
        }
        Ok(events)
    }

    async fn insert_event(&self, bucket_id: &str, event: Event) -> StoreResult<EventId> {
        let mut state = self.state()?;
        let id = state.next_id;
        let bucket = state
            .buckets
            .get_mut(bucket_id)
            .ok_or_else(|| StoreError::BucketNotFound(bucket_id.to_string()))?;
        bucket.events.push(event.with_id(id));
        state.next_id = id.next();
        Ok(id)
    }

    async fn delete_event(&self, bucket_id: &str, id: EventId) -> StoreResult<()> {
        let mut state = self.state()?;
        let bucket = state
            .buckets
            .get_mut(bucket_id)
            .ok_or_else(|| StoreError::BucketNotFound(bucket_id.to_string()))?;
        bucket.events.retain(|event| event.id != Some(id));
        Ok(())
    }
}
