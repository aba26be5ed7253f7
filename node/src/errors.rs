// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use commit_relay_core::error::{StoreError, ValidationError};
use thiserror::Error;

use crate::api::StatusResponse;

/// Failure on the ingest path, as seen by the HTTP caller.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Details go to the error sink, never to the caller.
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = match self {
            IngestError::Validation(_) => StatusCode::BAD_REQUEST,
            IngestError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(StatusResponse::error(self.to_string()))).into_response()
    }
}

/// The remote endpoint did not acknowledge a batch.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to send data to external server. Status code: {0}")]
    Status(u16),
    #[error("Failed to send data to external server: {0}")]
    Request(String),
    #[error("Failed to encode sync batch: {0}")]
    Encode(String),
}

#[derive(Error, Debug)]
pub enum FlushError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Failed to read sync buffer: {0}")]
    Buffer(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Error log write failed: {0}")]
    Io(#[from] std::io::Error),
}
