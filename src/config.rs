// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration constants.

/// Bucket that buffers commits until they are synced.
pub const DEFAULT_COMMIT_BUCKET: &str = "git-commits-bucket";

/// Event type the commit bucket is created with.
pub const COMMIT_EVENT_TYPE: &str = "git-commit";

/// Number of events the collector reads from each source bucket.
pub const SNAPSHOT_EVENT_LIMIT: usize = 1;

/// Fields every commit notification must carry, in validation order.
pub const REQUIRED_COMMIT_FIELDS: [&str; 4] = ["commit_hash", "commit_message", "author", "timestamp"];
