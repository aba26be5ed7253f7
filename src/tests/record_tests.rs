// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::error::ValidationError;
use crate::types::CommitRecord;

#[test]
fn test_valid_payload() {
    let body = br#"{"commit_hash":"abc123","commit_message":"fix","author":"alice","timestamp":1700000000}"#;
    let record = CommitRecord::from_payload(body).unwrap();
    assert_eq!(record.commit_hash, "abc123");
    assert_eq!(record.commit_message, "fix");
    assert_eq!(record.author, "alice");
    assert_eq!(record.timestamp.timestamp(), 1700000000);
}

#[test]
fn test_missing_author() {
    let body = br#"{"commit_hash":"abc123","commit_message":"fix","timestamp":1700000000}"#;
    let err = CommitRecord::from_payload(body).unwrap_err();
    assert_eq!(err, ValidationError::MissingField("author"));
    assert_eq!(err.to_string(), "Missing required field: author");
}

#[test]
fn test_null_counts_as_missing() {
    let body = br#"{"commit_hash":null,"commit_message":"fix","author":"alice","timestamp":1}"#;
    assert_eq!(
        CommitRecord::from_payload(body).unwrap_err(),
        ValidationError::MissingField("commit_hash")
    );
}

#[test]
fn test_first_missing_field_reported() {
    // Wrong type on commit_hash must not mask the missing timestamp.
    let body = br#"{"commit_hash":42,"commit_message":"fix","author":"alice"}"#;
    assert_eq!(
        CommitRecord::from_payload(body).unwrap_err(),
        ValidationError::MissingField("timestamp")
    );
}

#[test]
fn test_no_body_variants() {
    let bodies: [&[u8]; 5] = [b"", b"   \n", b"not json", b"[1,2,3]", b"\"text\""];
    for body in bodies {
        assert_eq!(CommitRecord::from_payload(body).unwrap_err(), ValidationError::NoBody);
    }
}

#[test]
fn test_non_string_field() {
    let body = br#"{"commit_hash":"a","commit_message":["x"],"author":"alice","timestamp":1}"#;
    assert_eq!(
        CommitRecord::from_payload(body).unwrap_err(),
        ValidationError::InvalidField("commit_message")
    );
}

#[test]
fn test_bad_timestamp() {
    let body = br#"{"commit_hash":"a","commit_message":"m","author":"alice","timestamp":"soon"}"#;
    assert!(matches!(
        CommitRecord::from_payload(body),
        Err(ValidationError::InvalidTimestamp(_))
    ));
}

#[test]
fn test_extra_fields_ignored() {
    let body = br#"{"commit_hash":"a","commit_message":"m","author":"alice","timestamp":"2023-11-14T22:13:20Z","branch":"main"}"#;
    let record = CommitRecord::from_payload(body).unwrap();
    assert_eq!(record.timestamp.timestamp(), 1700000000);
}
