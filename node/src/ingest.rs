// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Commit ingestion: validate, enrich with the watcher snapshot, buffer.

use commit_relay_core::event::CommitEventData;
use commit_relay_core::storage::EventStore;
use commit_relay_core::types::{CommitRecord, EventId};

use crate::errors::IngestError;
use crate::relay::Relay;
use crate::sink::{ErrorEntry, ErrorSink};

impl<S: EventStore, K: ErrorSink> Relay<S, K> {
    /// Buffers one commit notification and returns the id the store assigned.
    ///
    /// Validation failures are returned as-is. Anything that goes wrong after
    /// validation is written to the error sink and surfaces as
    /// [`IngestError::Internal`]; in that case nothing was appended.
    pub async fn ingest(&self, payload: &[u8]) -> Result<EventId, IngestError> {
        let commit = CommitRecord::from_payload(payload)?;
        let hash = commit.commit_hash.clone();

        // Snapshot is taken outside the lock.
        let default_data = match self.collector.collect().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                return Err(self
                    .internal_failure(format!("Error collecting watcher snapshot: {}", e), crate::sink_location!())
                    .await)
            }
        };

        let event = match CommitEventData::new(commit, default_data).into_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(self
                    .internal_failure(format!("Error encoding commit event: {}", e), crate::sink_location!())
                    .await)
            }
        };

        let appended = {
            let mut bucket = self.lock_bucket().await;
            let appended = bucket.append(event).await;
            appended
        };

        match appended {
            Ok(id) => {
                metrics::counter!("commit_relay_commits_ingested_total", 1);
                tracing::debug!("Buffered commit {} as event {}", hash, id);
                Ok(id)
            }
            Err(e) => Err(self
                .internal_failure(format!("Error processing request: {}", e), crate::sink_location!())
                .await),
        }
    }

    async fn internal_failure(&self, message: String, location: &'static str) -> IngestError {
        tracing::error!(location, "{}", message);
        metrics::counter!("commit_relay_ingest_failures_total", 1);
        self.report(ErrorEntry::new(message, location)).await;
        IngestError::Internal
    }
}
