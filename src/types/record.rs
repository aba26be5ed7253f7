// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Commit notification payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::REQUIRED_COMMIT_FIELDS;
use crate::error::ValidationError;
use crate::types::timestamp::parse_timestamp;

/// A single commit as reported by a git hook. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub commit_hash: String,
    pub commit_message: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

impl CommitRecord {
    /// Validates a raw request body.
    ///
    /// An empty body, malformed JSON or a non-object document all count as
    /// "no body": there is nothing a field check could be run against.
    pub fn from_payload(payload: &[u8]) -> Result<Self, ValidationError> {
        if payload.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::NoBody);
        }
        let value: Value = serde_json::from_slice(payload).map_err(|_| ValidationError::NoBody)?;
        Self::from_json(&value)
    }

    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let object = value.as_object().ok_or(ValidationError::NoBody)?;

        // Presence is checked for every field before any type check so the
        // caller always learns about the first missing field.
        for field in REQUIRED_COMMIT_FIELDS {
            match object.get(field) {
                None | Some(Value::Null) => return Err(ValidationError::MissingField(field)),
                Some(_) => {}
            }
        }

        Ok(Self {
            commit_hash: text_field(object, "commit_hash")?,
            commit_message: text_field(object, "commit_message")?,
            author: text_field(object, "author")?,
            timestamp: parse_timestamp(&object["timestamp"])?,
        })
    }
}

fn text_field(object: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(ValidationError::InvalidField(field))
}
