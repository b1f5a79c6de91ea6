//! BuildCycle entity - one end-to-end attempt to compile the watched project
//!
//! Lifecycle: created `Pending` when the debouncer fires, moved to `Running`
//! by the orchestrator, finalized exactly once with a [`BuildOutcome`].
//! A cycle is never reused; the next trigger gets a fresh id.

use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Lines of build output kept for diagnostics
pub const DEFAULT_OUTPUT_LINES: usize = 200;

/// Bounded buffer that keeps only the last N lines of output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTail {
    lines: VecDeque<String>,
    capacity: usize,
    dropped: usize,
}

impl Default for OutputTail {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_LINES)
    }
}

impl OutputTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    /// Append a line, evicting the oldest one when full
    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
            self.dropped += 1;
        }
        self.lines.push_back(line.into());
    }

    /// Append every line of a text blob
    pub fn extend_from_text(&mut self, text: &str) {
        for line in text.lines() {
            self.push(line);
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Last `n` retained lines, oldest first
    pub fn last(&self, n: usize) -> Vec<String> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).cloned().collect()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines evicted because the buffer was full
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Why a build did not succeed
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BuildFailure {
    /// Process exited with a non-zero status
    ExitCode { code: i32 },
    /// Process was terminated by a signal
    Signaled,
    /// Exceeded the configured maximum duration and was killed
    Timeout { after_ms: u64 },
    /// Killed because the watch session is stopping
    Cancelled,
    /// The command could not be started at all
    SpawnFailed { message: String },
}

impl BuildFailure {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BuildFailure::ExitCode { code } => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildFailure::ExitCode { code } => write!(f, "exited with code {}", code),
            BuildFailure::Signaled => write!(f, "terminated by signal"),
            BuildFailure::Timeout { after_ms } => write!(f, "timed out after {}ms", after_ms),
            BuildFailure::Cancelled => write!(f, "cancelled"),
            BuildFailure::SpawnFailed { message } => write!(f, "failed to start: {}", message),
        }
    }
}

/// Result of running the build command once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Succeeded {
        output: OutputTail,
        duration: Duration,
    },
    Failed {
        failure: BuildFailure,
        output: OutputTail,
        duration: Duration,
    },
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Succeeded { .. })
    }

    pub fn output(&self) -> &OutputTail {
        match self {
            BuildOutcome::Succeeded { output, .. } | BuildOutcome::Failed { output, .. } => output,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            BuildOutcome::Succeeded { duration, .. } | BuildOutcome::Failed { duration, .. } => {
                *duration
            }
        }
    }

    pub fn failure(&self) -> Option<&BuildFailure> {
        match self {
            BuildOutcome::Succeeded { .. } => None,
            BuildOutcome::Failed { failure, .. } => Some(failure),
        }
    }
}

/// Ordered status of a cycle: Pending -> Running -> Succeeded | Failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Pending,
    Running,
    Succeeded,
    Failed(BuildFailure),
}

impl BuildStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, BuildStatus::Succeeded | BuildStatus::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            BuildStatus::Pending => "pending",
            BuildStatus::Running => "running",
            BuildStatus::Succeeded => "succeeded",
            BuildStatus::Failed(_) => "failed",
        }
    }
}

/// Illegal lifecycle operation on a cycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    #[error("build cycle {id} cannot start from status '{status}'")]
    NotPending { id: u64, status: &'static str },

    #[error("build cycle {id} was never started")]
    NotStarted { id: u64 },

    #[error("build cycle {id} is already finalized")]
    AlreadyFinalized { id: u64 },
}

/// One build attempt
#[derive(Debug, Clone, PartialEq)]
pub struct BuildCycle {
    id: u64,
    triggered_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    status: BuildStatus,
    output: OutputTail,
    duration: Option<Duration>,
    changes: Vec<PathBuf>,
}

impl BuildCycle {
    /// Create a pending cycle for the coalesced set of changed paths
    pub fn new(id: u64, changes: Vec<PathBuf>) -> Self {
        Self {
            id,
            triggered_at: Utc::now(),
            started_at: None,
            ended_at: None,
            status: BuildStatus::Pending,
            output: OutputTail::default(),
            duration: None,
            changes,
        }
    }

    /// Pending -> Running
    pub fn start(&mut self) -> Result<(), CycleError> {
        if self.status != BuildStatus::Pending {
            return Err(CycleError::NotPending {
                id: self.id,
                status: self.status.label(),
            });
        }
        self.status = BuildStatus::Running;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Running -> Succeeded | Failed. Only ever succeeds once.
    pub fn finish(&mut self, outcome: BuildOutcome) -> Result<(), CycleError> {
        match self.status {
            BuildStatus::Running => {}
            BuildStatus::Pending => return Err(CycleError::NotStarted { id: self.id }),
            BuildStatus::Succeeded | BuildStatus::Failed(_) => {
                return Err(CycleError::AlreadyFinalized { id: self.id })
            }
        }

        self.ended_at = Some(Utc::now());
        match outcome {
            BuildOutcome::Succeeded { output, duration } => {
                self.status = BuildStatus::Succeeded;
                self.output = output;
                self.duration = Some(duration);
            }
            BuildOutcome::Failed {
                failure,
                output,
                duration,
            } => {
                self.status = BuildStatus::Failed(failure);
                self.output = output;
                self.duration = Some(duration);
            }
        }
        Ok(())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn status(&self) -> &BuildStatus {
        &self.status
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == BuildStatus::Succeeded
    }

    pub fn failure(&self) -> Option<&BuildFailure> {
        match &self.status {
            BuildStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn output(&self) -> &OutputTail {
        &self.output
    }

    pub fn changes(&self) -> &[PathBuf] {
        &self.changes
    }

    pub fn triggered_at(&self) -> DateTime<Utc> {
        self.triggered_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }
}
