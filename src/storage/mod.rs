// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Event store contract.
//!
//! The relay never owns durable state itself: every buffered commit lives in
//! an external bucket store reached through [`EventStore`]. Adapters only have
//! to provide the five operations below.
//!
//! # Contract
//! - `insert_event` assigns a fresh, unique [`EventId`].
//! - `get_events` returns newest first (by timestamp, ties by insertion) and
//!   honours an optional limit.
//! - `delete_event` on an id that is not present is a no-op.
//! - Mutations of one bucket are never interleaved by the caller; adapters
//!   need not serialise them.

use std::future::Future;

use crate::error::StoreResult;
use crate::event::{BucketInfo, Event};
use crate::types::EventId;

pub mod memory;

pub use memory::MemoryStore;

pub trait EventStore: Send + Sync + 'static {
    /// Creates a bucket. Creating an existing bucket is not an error.
    fn create_bucket(&self, bucket_id: &str, event_type: &str) -> impl Future<Output = StoreResult<()>> + Send;

    fn list_buckets(&self) -> impl Future<Output = StoreResult<Vec<BucketInfo>>> + Send;

    fn get_events(&self, bucket_id: &str, limit: Option<usize>) -> impl Future<Output = StoreResult<Vec<Event>>> + Send;

    fn insert_event(&self, bucket_id: &str, event: Event) -> impl Future<Output = StoreResult<EventId>> + Send;

    fn delete_event(&self, bucket_id: &str, id: EventId) -> impl Future<Output = StoreResult<()>> + Send;
}
