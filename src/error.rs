// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

/// Client-caused rejection of a commit payload.
///
/// The display strings are returned verbatim to HTTP callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No JSON body provided")]
    NoBody,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid field: {0} must be a string")]
    InvalidField(&'static str),
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Failure reported by an event store adapter.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),
    #[error("Store backend error: {0}")]
    Backend(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = core::result::Result<T, StoreError>;
