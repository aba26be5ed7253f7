// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! commit-relay-core: commit records, payload validation, the event store
//! contract and the watcher snapshot collector shared by the relay node.
//!
//! Nothing in this crate depends on an async runtime. Store operations are
//! expressed as `Send` futures so the node can drive them from tokio tasks.

pub mod config;
pub mod error;
pub mod types;
pub mod event;
pub mod storage;
pub mod collector;

#[cfg(test)]
pub mod tests;
