//! Build Executor
//!
//! Runs the configured build command through the platform shell and turns
//! the process result into a [`BuildOutcome`].

use std::path::Path;
use std::time::{Duration, Instant};

use crate::domain::entities::{BuildFailure, BuildOutcome, OutputTail, DEFAULT_OUTPUT_LINES};
use crate::domain::ports::{LaunchError, ProcessExit, ProcessLauncher, ProcessSpec};
use crate::domain::value_objects::CancelToken;

pub struct BuildExecutor<L: ProcessLauncher> {
    launcher: L,
    timeout: Option<Duration>,
    output_lines: usize,
}

impl<L: ProcessLauncher> BuildExecutor<L> {
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            timeout: None,
            output_lines: DEFAULT_OUTPUT_LINES,
        }
    }

    /// Kill the build and report `Timeout` once it runs longer than this
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_output_lines(mut self, lines: usize) -> Self {
        self.output_lines = lines;
        self
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Run `command` in `working_dir` and block until it exits.
    ///
    /// Never returns an error: every way a build can go wrong is a
    /// [`BuildFailure`].
    pub fn run(&self, command: &str, working_dir: &Path, cancel: &CancelToken) -> BuildOutcome {
        let spec = ProcessSpec::shell(command)
            .current_dir(working_dir)
            .timeout(self.timeout)
            .output_lines(self.output_lines);

        let started = Instant::now();
        tracing::debug!(command = %command, cwd = %working_dir.display(), "starting build");

        let output = match self.launcher.run(&spec, cancel) {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(error = %err, "build command could not be started");
                return BuildOutcome::Failed {
                    failure: spawn_failure(err),
                    output: OutputTail::new(self.output_lines),
                    duration: started.elapsed(),
                };
            }
        };

        let failure = match output.exit {
            ProcessExit::Code(0) => {
                return BuildOutcome::Succeeded {
                    output: output.output,
                    duration: output.duration,
                }
            }
            ProcessExit::Code(code) => BuildFailure::ExitCode { code },
            ProcessExit::Signaled => BuildFailure::Signaled,
            ProcessExit::TimedOut { after } => BuildFailure::Timeout {
                after_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
            },
            ProcessExit::Cancelled => BuildFailure::Cancelled,
        };

        tracing::debug!(reason = %failure, "build failed");
        BuildOutcome::Failed {
            failure,
            output: output.output,
            duration: output.duration,
        }
    }
}

fn spawn_failure(err: LaunchError) -> BuildFailure {
    BuildFailure::SpawnFailed {
        message: err.to_string(),
    }
}
