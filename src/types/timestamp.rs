// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Commit timestamp canonicalisation.
//!
//! Git hooks report the commit time either as epoch seconds (a JSON number or
//! a numeric string, fractions allowed) or as an RFC 3339 string. Every form is
//! normalised to a UTC instant before the commit is buffered.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::ValidationError;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Parses the `timestamp` field of a commit payload.
pub fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>, ValidationError> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(secs) => from_epoch_seconds(secs),
            None => Err(ValidationError::InvalidTimestamp(n.to_string())),
        },
        Value::String(s) => parse_timestamp_str(s),
        other => Err(ValidationError::InvalidTimestamp(other.to_string())),
    }
}

fn parse_timestamp_str(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = raw.trim();
    if let Ok(secs) = trimmed.parse::<f64>() {
        return from_epoch_seconds(secs);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp(raw.to_string()))
}

/// Converts fractional epoch seconds into a UTC instant.
pub fn from_epoch_seconds(secs: f64) -> Result<DateTime<Utc>, ValidationError> {
    if !secs.is_finite() {
        return Err(ValidationError::InvalidTimestamp(secs.to_string()));
    }
    let whole = secs.floor();
    // Rounding can land exactly on the next second.
    let nanos = (((secs - whole) * NANOS_PER_SEC).round() as u32).min(999_999_999);
    Utc.timestamp_opt(whole as i64, nanos)
        .single()
        .ok_or_else(|| ValidationError::InvalidTimestamp(secs.to_string()))
}
