// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use commit_relay_core::config::DEFAULT_COMMIT_BUCKET;
use reqwest::Url;
use thiserror::Error;

use crate::scheduler::RetryPolicy;

/// Which backing store holds the buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StoreKind {
    /// ActivityWatch-compatible REST server.
    #[default]
    AwServer,
    /// Process-local store; buffered commits are lost on exit.
    Memory,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: SocketAddr,
    /// Aggregation endpoint the buffer is flushed to. Required.
    pub remote_url: String,
    pub flush_interval: Duration,
    /// Upper bound on one sync request, so a hung remote cannot hold the
    /// commit bucket lock forever.
    pub sync_timeout: Duration,
    /// Enables capped exponential backoff between failed flushes.
    pub backoff_cap: Option<Duration>,
    pub store: StoreKind,
    pub aw_server_url: String,
    pub bucket_id: String,
    pub client_name: String,
    pub hostname: String,
    pub error_log_path: PathBuf,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            remote_url: String::new(),
            flush_interval: Duration::from_secs(1800),
            sync_timeout: Duration::from_secs(30),
            backoff_cap: None,
            store: StoreKind::default(),
            aw_server_url: "http://127.0.0.1:5600".to_string(),
            bucket_id: DEFAULT_COMMIT_BUCKET.to_string(),
            client_name: "commit-relay".to_string(),
            hostname: "unknown".to_string(),
            error_log_path: PathBuf::from("commit-relay-errors.log"),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("remote sync URL is required")]
    MissingRemoteUrl,
    #[error("invalid URL {0}: expected an http(s) URL")]
    InvalidUrl(String),
    #[error("flush interval must be greater than zero")]
    ZeroFlushInterval,
    #[error("bucket id must not be empty")]
    EmptyBucketId,
}

impl RelayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote_url.trim().is_empty() {
            return Err(ConfigError::MissingRemoteUrl);
        }
        check_http_url(&self.remote_url)?;
        if self.store == StoreKind::AwServer {
            check_http_url(&self.aw_server_url)?;
        }
        if self.flush_interval.is_zero() {
            return Err(ConfigError::ZeroFlushInterval);
        }
        if self.bucket_id.is_empty() {
            return Err(ConfigError::EmptyBucketId);
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        match self.backoff_cap {
            Some(cap) => RetryPolicy::CappedBackoff { cap },
            None => RetryPolicy::Fixed,
        }
    }
}

fn check_http_url(raw: &str) -> Result<(), ConfigError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidUrl(raw.to_string())),
    }
}
