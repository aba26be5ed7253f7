// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod id;
pub mod record;
pub mod timestamp;

pub use id::EventId;
pub use record::CommitRecord;
pub use timestamp::parse_timestamp;
