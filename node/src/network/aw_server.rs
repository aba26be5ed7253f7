// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! [`EventStore`] backed by an ActivityWatch-compatible REST server.
//!
//! Endpoints used, relative to the configured base URL:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | create bucket | `POST /api/0/buckets/{id}` |
//! | list buckets | `GET /api/0/buckets/` |
//! | get events | `GET /api/0/buckets/{id}/events?limit=N` |
//! | insert event | `POST /api/0/buckets/{id}/events` |
//! | delete event | `DELETE /api/0/buckets/{id}/events/{event_id}` |

use std::collections::HashMap;
use std::time::Duration;

use commit_relay_core::error::{StoreError, StoreResult};
use commit_relay_core::event::{BucketInfo, Event};
use commit_relay_core::storage::EventStore;
use commit_relay_core::types::EventId;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct AwServerStore {
    base_url: Url,
    client: Client,
    client_name: String,
    hostname: String,
}

#[derive(Serialize)]
struct CreateBucketRequest<'a> {
    client: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    hostname: &'a str,
}

impl AwServerStore {
    pub fn new(
        base_url: &str,
        client_name: impl Into<String>,
        hostname: impl Into<String>,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Backend(format!("invalid aw-server URL {}: {}", base_url, e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self {
            base_url,
            client,
            client_name: client_name.into(),
            hostname: hostname.into(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| StoreError::Backend(format!("{} cannot be a base URL", self.base_url)))?;
            path.pop_if_empty().extend(["api", "0", "buckets"]).extend(segments);
        }
        Ok(url)
    }

    fn bucket_events(&self, bucket_id: &str) -> StoreResult<Url> {
        self.endpoint(&[bucket_id, "events"])
    }
}

fn backend(e: reqwest::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn check(resp: Response, bucket_id: &str) -> StoreResult<Response> {
    match resp.status() {
        s if s.is_success() => Ok(resp),
        StatusCode::NOT_FOUND => Err(StoreError::BucketNotFound(bucket_id.to_string())),
        s => Err(StoreError::Backend(format!("aw-server returned {} for bucket {}", s, bucket_id))),
    }
}

impl EventStore for AwServerStore {
    async fn create_bucket(&self, bucket_id: &str, event_type: &str) -> StoreResult<()> {
        let body = CreateBucketRequest {
            client: &self.client_name,
            event_type,
            hostname: &self.hostname,
        };
        let resp = self
            .client
            .post(self.endpoint(&[bucket_id])?)
            .json(&body)
            .send()
            .await
            .map_err(backend)?;

        // The server answers 304 when the bucket already exists.
        if resp.status() == StatusCode::NOT_MODIFIED {
            return Ok(());
        }
        check(resp, bucket_id)?;
        Ok(())
    }

    async fn list_buckets(&self) -> StoreResult<Vec<BucketInfo>> {
        let resp = self
            .client
            .get(self.endpoint(&[""])?)
            .send()
            .await
            .map_err(backend)?;
        let resp = check(resp, "*")?;
        let buckets: HashMap<String, BucketInfo> = resp.json().await.map_err(backend)?;

        let mut buckets: Vec<BucketInfo> = buckets.into_values().collect();
        buckets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(buckets)
    }

    async fn get_events(&self, bucket_id: &str, limit: Option<usize>) -> StoreResult<Vec<Event>> {
        let mut url = self.bucket_events(bucket_id)?;
        if let Some(limit) = limit {
            url.query_pairs_mut().append_pair("limit", &limit.to_string());
        }
        let resp = self.client.get(url).send().await.map_err(backend)?;
        let resp = check(resp, bucket_id)?;
        resp.json().await.map_err(backend)
    }

    async fn insert_event(&self, bucket_id: &str, event: Event) -> StoreResult<EventId> {
        let resp = self
            .client
            .post(self.bucket_events(bucket_id)?)
            .json(&[event])
            .send()
            .await
            .map_err(backend)?;
        let resp = check(resp, bucket_id)?;

        // Depending on the server version the inserted event comes back
        // either bare or wrapped in a one-element array.
        let value: Value = resp.json().await.map_err(backend)?;
        let inserted = match value {
            Value::Array(items) => items.into_iter().next(),
            other => Some(other),
        };
        inserted
            .as_ref()
            .and_then(|e| e.get("id"))
            .and_then(Value::as_u64)
            .map(EventId)
            .ok_or_else(|| StoreError::Backend(format!("aw-server did not assign an id in bucket {}", bucket_id)))
    }

    async fn delete_event(&self, bucket_id: &str, id: EventId) -> StoreResult<()> {
        let url = self.endpoint(&[bucket_id, "events", &id.to_string()])?;
        let resp = self.client.delete(url).send().await.map_err(backend)?;

        // An event that is already gone is not an error.
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check(resp, bucket_id)?;
        Ok(())
    }
}
