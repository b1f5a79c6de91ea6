//! Watch Event Port
//!
//! Observable interface for the watch-build-deploy loop.
//! Enables console status lines, NDJSON event streams, and tests.

use serde::Serialize;

use crate::domain::value_objects::WatchState;

/// Event emitted by the watch loop and the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    /// Watch started
    WatchStarted {
        project: String,
        artifact: String,
        target: String,
    },
    /// Debouncer fired with the coalesced change set
    ChangesDetected { paths: Vec<String> },
    /// Orchestrator state transition
    StateChanged { from: WatchState, to: WatchState },
    /// A request arrived while busy and was queued behind the current cycle
    BuildQueued { paths: Vec<String> },
    /// Build command started
    BuildStarted { cycle: u64, command: String },
    /// Build exited with status 0
    BuildSucceeded { cycle: u64, duration_ms: u64 },
    /// Build failed (non-zero exit, timeout, cancelled, spawn failure)
    BuildFailed {
        cycle: u64,
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
        output_tail: Vec<String>,
    },
    /// Deploy step started
    DeployStarted {
        cycle: u64,
        artifact: String,
        target: String,
    },
    /// Deploy step finished
    DeployFinished { cycle: u64, detail: String },
    /// Deploy step failed; not retried
    DeployFailed { cycle: u64, error: String },
    /// Non-fatal loop error (watcher hiccup, etc.)
    Error { message: String },
    /// Watch stopped
    Shutdown,
}

impl WatchEvent {
    /// Convert to JSON string with "command": "watch" field included
    pub fn to_json(&self) -> String {
        let mut value =
            serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"event": "error"}));
        if let Some(obj) = value.as_object_mut() {
            obj.insert("command".to_string(), serde_json::json!("watch"));
        }
        serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Failure events must stay visible even in quiet output modes
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            WatchEvent::BuildFailed { .. } | WatchEvent::DeployFailed { .. } | WatchEvent::Error { .. }
        )
    }
}

/// Trait for receiving watch events
///
/// Implementations can be:
/// - ConsoleWatchSink: human status lines in the terminal
/// - JsonEventSink: NDJSON event stream for CI
/// - NoopEventSink: Silent operation
pub trait WatchEventSink: Send + Sync {
    fn on_event(&self, event: WatchEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl WatchEventSink for NoopEventSink {
    fn on_event(&self, _event: WatchEvent) {}
}

impl<F> WatchEventSink for F
where
    F: Fn(WatchEvent) + Send + Sync,
{
    fn on_event(&self, event: WatchEvent) {
        self(event)
    }
}
