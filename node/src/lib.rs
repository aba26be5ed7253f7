// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod config;
pub mod errors;
pub mod api;
pub mod sink;
pub mod network;
pub mod relay;
pub mod ingest;
pub mod flush;
pub mod scheduler;
pub mod server;
pub mod telemetry;
