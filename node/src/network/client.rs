// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::time::Duration;

use commit_relay_core::event::Event;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::errors::TransportError;

/// BLAKE3 hex digest of the request body. A batch that is re-sent unchanged
/// after a failed delete carries the same digest, which lets the receiver
/// drop the duplicate.
pub const BATCH_DIGEST_HEADER: &str = "x-batch-digest";

/// Posts buffered events to the remote aggregation endpoint.
#[derive(Debug, Clone)]
pub struct SyncClient {
    remote_url: String,
    client: Client,
}

impl SyncClient {
    pub fn new(remote_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { remote_url: remote_url.into(), client })
    }

    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    /// Sends the whole batch as one JSON array. Only a 2xx status counts as
    /// an acknowledgement.
    pub async fn send_batch(&self, events: &[Event]) -> Result<(), TransportError> {
        let body = serde_json::to_vec(events).map_err(|e| TransportError::Encode(e.to_string()))?;
        let digest = blake3::hash(&body);

        let resp = self
            .client
            .post(&self.remote_url)
            .header(CONTENT_TYPE, "application/json")
            .header(BATCH_DIGEST_HEADER, digest.to_hex().as_str())
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(TransportError::Status(resp.status().as_u16()));
        }
        Ok(())
    }
}
