// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Buffer flush: list, transmit, delete what was acknowledged.
//!
//! Delivery is at-least-once. The ids eligible for deletion are exactly the
//! ids of the batch that was sent; commits appended after the listing wait
//! for the next cycle. A rejected batch leaves the buffer untouched, and a
//! delete that fails after a successful send leaves that one event to be
//! sent again. Deduplicating such re-sends is the receiver's job.

use std::time::Instant;

use commit_relay_core::storage::EventStore;
use commit_relay_core::types::EventId;

use crate::errors::FlushError;
use crate::relay::Relay;
use crate::sink::{ErrorEntry, ErrorSink};

/// Outcome of one successful flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Events transmitted in the batch.
    pub sent: usize,
    /// Transmitted events removed from the buffer.
    pub deleted: usize,
    /// Transmitted events whose delete failed; they will be sent again.
    pub failed_deletes: usize,
}

impl<S: EventStore, K: ErrorSink> Relay<S, K> {
    pub async fn flush(&self) -> Result<FlushReport, FlushError> {
        let started = Instant::now();

        // 1. The lock is held for the whole list -> send -> delete sequence.
        let mut bucket = self.lock_bucket().await;

        // 2. Snapshot the buffer.
        let events = match bucket.buffered().await {
            Ok(events) => events,
            Err(e) => {
                let message = format!("Failed to read sync buffer: {}", e);
                tracing::error!("{}", message);
                self.report(ErrorEntry::new(message, crate::sink_location!())).await;
                return Err(FlushError::Buffer(e));
            }
        };
        if events.is_empty() {
            tracing::debug!("Sync buffer empty, nothing to flush");
            return Ok(FlushReport::default());
        }

        // 3. Only these ids may be deleted.
        let ids: Vec<EventId> = events.iter().filter_map(|e| e.id).collect();

        // 4. One request for the whole batch.
        if let Err(e) = self.sync_client().send_batch(&events).await {
            tracing::warn!("Sync of {} buffered commits failed: {}", events.len(), e);
            metrics::counter!("commit_relay_flush_failures_total", 1);
            metrics::gauge!("commit_relay_buffered_events", events.len() as f64);
            self.report(ErrorEntry::new(e.to_string(), crate::sink_location!())).await;
            return Err(e.into());
        }

        // 5. Acknowledged: remove exactly what was sent.
        let mut report = FlushReport { sent: events.len(), ..Default::default() };
        for id in ids {
            match bucket.remove(id).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    report.failed_deletes += 1;
                    let message = format!("Failed to delete synced event {}: {}", id, e);
                    tracing::error!("{}", message);
                    self.report(ErrorEntry::new(message, crate::sink_location!())).await;
                }
            }
        }
        drop(bucket);

        metrics::counter!("commit_relay_flush_events_sent_total", report.sent as u64);
        metrics::gauge!("commit_relay_buffered_events", (report.sent - report.deleted) as f64);
        metrics::histogram!("commit_relay_flush_duration_seconds", started.elapsed().as_secs_f64());
        tracing::info!(
            "Synced {} commits to {} ({} deleted, {} delete failures)",
            report.sent,
            self.sync_client().remote_url(),
            report.deleted,
            report.failed_deletes
        );
        Ok(report)
    }
}
