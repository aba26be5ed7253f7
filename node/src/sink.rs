// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error sink.
//!
//! Failures that an operator has to look at later (internal ingest errors,
//! rejected sync batches, failed deletes) are appended to a plain text log in
//! addition to the tracing output. Each entry carries the source location that
//! produced it.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Mutex as StdMutex;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::errors::SinkError;

/// `module::path:line` of the call site.
#[macro_export]
macro_rules! sink_location {
    () => {
        concat!(module_path!(), ":", line!())
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub message: String,
    pub location: &'static str,
}

impl ErrorEntry {
    pub fn new(message: impl Into<String>, location: &'static str) -> Self {
        Self { message: message.into(), location }
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.message, self.location)
    }
}

pub trait ErrorSink: Send + Sync + 'static {
    fn append(&self, entry: ErrorEntry) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Appends one line per entry to a file, creating parent directories on demand.
pub struct FileErrorSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileErrorSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }
}

impl ErrorSink for FileErrorSink {
    async fn append(&self, entry: ErrorEntry) -> Result<(), SinkError> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", entry).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Keeps entries in memory. Used by tests and embedders that ship errors
/// elsewhere.
#[derive(Default)]
pub struct MemorySink {
    entries: StdMutex<Vec<ErrorEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorSink for MemorySink {
    async fn append(&self, entry: ErrorEntry) -> Result<(), SinkError> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
        Ok(())
    }
}
