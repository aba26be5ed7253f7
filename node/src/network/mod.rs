// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod aw_server;
pub mod client;

pub use aw_server::AwServerStore;
pub use client::{SyncClient, BATCH_DIGEST_HEADER};
