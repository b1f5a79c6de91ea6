//! Event Sink Implementations
//!
//! Provides concrete implementations of WatchEventSink:
//! - JsonEventSink: NDJSON output for CI/automation
//!
//! The human-readable console sink lives with the binary's UI code.

mod json;

pub use json::JsonEventSink;
