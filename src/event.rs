// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Event model shared with the backing store.
//!
//! An [`Event`] is the unit every bucket holds: an instant, a duration and an
//! opaque JSON payload. Commits are buffered as events whose payload is a
//! [`CommitEventData`], i.e. the commit plus the latest data of every other
//! watcher at ingest time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreResult;
use crate::types::{CommitRecord, EventId};

/// Latest payload of each source bucket, keyed by bucket id.
pub type SnapshotMap = BTreeMap<String, Value>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Assigned by the store; `None` until inserted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    pub timestamp: DateTime<Utc>,
    /// Seconds.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub data: Value,
}

impl Event {
    pub fn new(timestamp: DateTime<Utc>, duration: f64, data: Value) -> Self {
        Self { id: None, timestamp, duration, data }
    }

    pub fn with_id(mut self, id: EventId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Payload of a buffered commit event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommitEventData {
    pub git_commit: CommitRecord,
    pub default_data: SnapshotMap,
}

impl CommitEventData {
    pub fn new(git_commit: CommitRecord, default_data: SnapshotMap) -> Self {
        Self { git_commit, default_data }
    }

    /// Zero-duration event stamped with the commit time.
    pub fn into_event(self) -> StoreResult<Event> {
        let timestamp = self.git_commit.timestamp;
        let data = serde_json::to_value(self)?;
        Ok(Event::new(timestamp, 0.0, data))
    }

    pub fn from_event(event: &Event) -> StoreResult<Self> {
        Ok(serde_json::from_value(event.data.clone())?)
    }
}

/// Bucket metadata as reported by `list_buckets`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketInfo {
    pub id: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub hostname: String,
}

impl BucketInfo {
    pub fn new(id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            client: String::new(),
            hostname: String::new(),
        }
    }
}
