// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Periodic background flushing.

use std::time::Duration;

use commit_relay_core::storage::EventStore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::relay::SharedRelay;
use crate::sink::ErrorSink;

/// How long to wait before the next flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Always wait one interval. Failed batches are simply retried next tick.
    #[default]
    Fixed,
    /// Double the wait after each consecutive failure, up to `cap`. A cap
    /// below the interval is treated as the interval.
    CappedBackoff { cap: Duration },
}

impl RetryPolicy {
    pub fn delay(&self, interval: Duration, consecutive_failures: u32) -> Duration {
        match *self {
            RetryPolicy::Fixed => interval,
            RetryPolicy::CappedBackoff { cap } => {
                let factor = 2u32.saturating_pow(consecutive_failures);
                interval.saturating_mul(factor).min(cap.max(interval))
            }
        }
    }
}

/// Drives [`Relay::flush`](crate::relay::Relay::flush) until cancelled.
///
/// Cancellation is observed while sleeping and before each flush. A flush
/// that has already started always runs to completion.
pub struct SyncScheduler<S, K> {
    relay: SharedRelay<S, K>,
    interval: Duration,
    policy: RetryPolicy,
    shutdown: CancellationToken,
}

impl<S: EventStore, K: ErrorSink> SyncScheduler<S, K> {
    pub fn new(relay: SharedRelay<S, K>, interval: Duration, policy: RetryPolicy, shutdown: CancellationToken) -> Self {
        Self { relay, interval, policy, shutdown }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        tracing::info!(
            "Sync scheduler started: flushing to {} every {:?}",
            self.relay.sync_client().remote_url(),
            self.interval
        );
        let mut consecutive_failures: u32 = 0;

        loop {
            let delay = self.policy.delay(self.interval, consecutive_failures);
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
            if self.shutdown.is_cancelled() {
                break;
            }

            match self.relay.flush().await {
                Ok(report) => {
                    consecutive_failures = 0;
                    tracing::debug!("Flush complete: {:?}", report);
                }
                Err(e) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    tracing::warn!(
                        "Flush failed ({} in a row), buffer kept for next cycle: {}",
                        consecutive_failures,
                        e
                    );
                }
            }
        }

        tracing::info!("Sync scheduler stopped");
    }
}
