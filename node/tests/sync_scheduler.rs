// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
mod common;

use std::sync::Arc;
use std::time::Duration;

use commit_relay_core::storage::MemoryStore;
use commit_relay_node::scheduler::{RetryPolicy, SyncScheduler};
use common::*;
use tokio_util::sync::CancellationToken;

async fn wait_for(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_scheduler_flushes_periodically() {
    let remote = FakeRemote::start().await;
    let store = Arc::new(MemoryStore::new());
    let relay = relay_with(store.clone(), &remote.url).await;
    relay.ingest(&commit_body("c1")).await.unwrap();

    let shutdown = CancellationToken::new();
    let handle = SyncScheduler::new(relay.clone(), Duration::from_millis(20), RetryPolicy::Fixed, shutdown.clone()).spawn();

    wait_for(|| store.bucket_len(COMMIT_BUCKET) == 0).await;
    assert_eq!(remote.request_count(), 1);

    // Later commits go out on a later tick.
    relay.ingest(&commit_body("c2")).await.unwrap();
    wait_for(|| remote.request_count() == 2).await;

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();

    let batches = remote.batches();
    assert_eq!(commit_hashes(&batches[1].events), vec!["c2"]);
}

#[tokio::test]
async fn test_scheduler_survives_failures() {
    let remote = FakeRemote::start().await;
    remote.respond_with(503);
    let store = Arc::new(MemoryStore::new());
    let relay = relay_with(store.clone(), &remote.url).await;
    relay.ingest(&commit_body("c1")).await.unwrap();

    let shutdown = CancellationToken::new();
    let handle = SyncScheduler::new(relay.clone(), Duration::from_millis(20), RetryPolicy::Fixed, shutdown.clone()).spawn();

    wait_for(|| remote.request_count() >= 3).await;
    assert_eq!(store.bucket_len(COMMIT_BUCKET), 1);

    remote.respond_with(200);
    wait_for(|| store.bucket_len(COMMIT_BUCKET) == 0).await;

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    assert!(relay.sink().len() >= 3);
}

#[tokio::test]
async fn test_cancel_interrupts_sleep() {
    let remote = FakeRemote::start().await;
    let relay = relay_with(Arc::new(MemoryStore::new()), &remote.url).await;
    relay.ingest(&commit_body("c1")).await.unwrap();

    let shutdown = CancellationToken::new();
    let handle = SyncScheduler::new(relay.clone(), Duration::from_secs(3600), RetryPolicy::Fixed, shutdown.clone()).spawn();

    tokio::time::sleep(Duration::from_millis(20)).await;
    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();

    // Stopped without flushing.
    assert_eq!(remote.request_count(), 0);
    assert_eq!(relay.buffered_len().await.unwrap(), 1);
}

#[tokio::test]
async fn test_cancel_waits_for_in_flight_flush() {
    let remote = FakeRemote::start().await;
    remote.delay(Duration::from_millis(300));
    let store = Arc::new(MemoryStore::new());
    let relay = relay_with(store.clone(), &remote.url).await;
    relay.ingest(&commit_body("c1")).await.unwrap();

    let shutdown = CancellationToken::new();
    let handle = SyncScheduler::new(relay.clone(), Duration::from_millis(10), RetryPolicy::Fixed, shutdown.clone()).spawn();

    // Let the first flush start, then cancel while the remote is still busy.
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();

    assert_eq!(remote.request_count(), 1);
    assert_eq!(store.bucket_len(COMMIT_BUCKET), 0);
}
