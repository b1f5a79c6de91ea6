//! Process Launcher Port
//!
//! The one primitive the build and deploy steps need from the OS:
//! run a command to completion with an optional timeout and captured output,
//! start a long-lived process, and terminate processes by predicate.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::domain::entities::{OutputTail, DEFAULT_OUTPUT_LINES};
use crate::domain::value_objects::{CancelToken, ProcessMatcher};

/// What to launch and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub output_lines: usize,
}

impl ProcessSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout: None,
            output_lines: DEFAULT_OUTPUT_LINES,
        }
    }

    /// Run a command line through the platform shell
    pub fn shell(command: &str) -> Self {
        if cfg!(windows) {
            Self::new("cmd").arg("/C").arg(command)
        } else {
            Self::new("sh").arg("-c").arg(command)
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn output_lines(mut self, lines: usize) -> Self {
        self.output_lines = lines;
        self
    }

    /// Human-readable command line for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a waited-on process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    Code(i32),
    Signaled,
    TimedOut { after: Duration },
    Cancelled,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        matches!(self, ProcessExit::Code(0))
    }
}

/// Result of [`ProcessLauncher::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit: ProcessExit,
    pub output: OutputTail,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("executable not found: {program}")]
    NotFound { program: String },

    #[error("failed to start '{program}': {message}")]
    Spawn { program: String, message: String },

    #[error("failed waiting for '{program}': {message}")]
    Wait { program: String, message: String },

    #[error("failed to terminate processes matching '{pattern}': {message}")]
    Terminate { pattern: String, message: String },
}

pub trait ProcessLauncher: Send + Sync {
    /// Run to completion (or timeout / cancellation), capturing output
    fn run(&self, spec: &ProcessSpec, cancel: &CancelToken) -> Result<ProcessOutput, LaunchError>;

    /// Start a process that outlives this call; returns its pid
    fn spawn_detached(&self, spec: &ProcessSpec) -> Result<u32, LaunchError>;

    /// Terminate every process matching the predicate, waiting at most
    /// `timeout` for them to exit. Returns how many were signalled.
    fn terminate_matching(
        &self,
        matcher: &ProcessMatcher,
        timeout: Duration,
    ) -> Result<usize, LaunchError>;
}

impl<T: ProcessLauncher + ?Sized> ProcessLauncher for Arc<T> {
    fn run(&self, spec: &ProcessSpec, cancel: &CancelToken) -> Result<ProcessOutput, LaunchError> {
        (**self).run(spec, cancel)
    }

    fn spawn_detached(&self, spec: &ProcessSpec) -> Result<u32, LaunchError> {
        (**self).spawn_detached(spec)
    }

    fn terminate_matching(
        &self,
        matcher: &ProcessMatcher,
        timeout: Duration,
    ) -> Result<usize, LaunchError> {
        (**self).terminate_matching(matcher, timeout)
    }
}
