//! Watch configuration
//!
//! Built once from the merged config and CLI flags, validated, then shared
//! read-only by the loop, the orchestrator and the deploy step.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::application::deploy::{DeployOptions, DEFAULT_KILL_TIMEOUT};
use crate::domain::entities::DEFAULT_OUTPUT_LINES;
use crate::domain::services::DEFAULT_QUIET_WINDOW;
use crate::domain::value_objects::{DeployTarget, IgnorePolicy};
use crate::error::{ToolboxError, ToolboxResult};

/// Default build command when none is configured
pub const DEFAULT_BUILD_COMMAND: &str = "make";

/// Immutable settings for one watch session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Directory that is watched and where the build runs
    pub project_root: PathBuf,
    /// Built artifact, relative to the project root unless absolute
    pub artifact: PathBuf,
    /// Shell command that builds the artifact
    pub build_command: String,
    /// Where a successful build goes
    pub target: DeployTarget,
    /// Emulator executable for the emulator target
    pub emulator: Option<String>,
    /// Extra emulator arguments
    pub emulator_args: Vec<String>,
    /// Hardware deploy command template
    pub deploy_command: Option<String>,
    /// Hardware device address
    pub host: Option<String>,
    /// Quiet period before a burst of changes triggers a build
    pub quiet_window: Duration,
    /// Maximum build duration
    pub build_timeout: Option<Duration>,
    /// Bound on terminating a previous emulator instance
    pub kill_timeout: Duration,
    /// Build output lines kept per cycle
    pub output_lines: usize,
    /// Extra ignore patterns on top of the defaults
    pub ignore: Vec<String>,
    /// Run one build before waiting for changes
    pub build_on_start: bool,
}

impl WatchConfig {
    pub fn new(project_root: impl Into<PathBuf>, artifact: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            artifact: artifact.into(),
            build_command: DEFAULT_BUILD_COMMAND.to_string(),
            target: DeployTarget::default(),
            emulator: None,
            emulator_args: Vec::new(),
            deploy_command: None,
            host: None,
            quiet_window: DEFAULT_QUIET_WINDOW,
            build_timeout: None,
            kill_timeout: DEFAULT_KILL_TIMEOUT,
            output_lines: DEFAULT_OUTPUT_LINES,
            ignore: Vec::new(),
            build_on_start: true,
        }
    }

    pub fn with_build_command(mut self, command: impl Into<String>) -> Self {
        self.build_command = command.into();
        self
    }

    pub fn with_target(mut self, target: DeployTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_emulator(mut self, emulator: Option<String>) -> Self {
        self.emulator = emulator;
        self
    }

    pub fn with_emulator_args(mut self, args: Vec<String>) -> Self {
        self.emulator_args = args;
        self
    }

    pub fn with_deploy_command(mut self, command: Option<String>) -> Self {
        self.deploy_command = command;
        self
    }

    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.host = host;
        self
    }

    pub fn with_quiet_window(mut self, window: Duration) -> Self {
        self.quiet_window = window;
        self
    }

    pub fn with_build_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.build_timeout = timeout;
        self
    }

    pub fn with_kill_timeout(mut self, timeout: Duration) -> Self {
        self.kill_timeout = timeout;
        self
    }

    pub fn with_output_lines(mut self, lines: usize) -> Self {
        self.output_lines = lines;
        self
    }

    pub fn with_ignore(mut self, patterns: Vec<String>) -> Self {
        self.ignore = patterns;
        self
    }

    pub fn with_build_on_start(mut self, build_on_start: bool) -> Self {
        self.build_on_start = build_on_start;
        self
    }

    /// Check invariants and canonicalize the project root.
    ///
    /// Everything that can be rejected up front is rejected here, so the
    /// loop never fails on configuration.
    pub fn validate(mut self) -> ToolboxResult<Self> {
        if !self.project_root.is_dir() {
            return Err(ToolboxError::InvalidProjectRoot {
                path: self.project_root,
            });
        }
        self.project_root = self.project_root.canonicalize()?;

        if self.build_command.trim().is_empty() {
            return Err(ToolboxError::config("build command must not be empty"));
        }
        if self.artifact.as_os_str().is_empty() {
            return Err(ToolboxError::config("artifact path must not be empty"));
        }
        if self.quiet_window.is_zero() {
            return Err(ToolboxError::config("quiet window must be greater than zero"));
        }
        if self.output_lines == 0 {
            return Err(ToolboxError::config("output_lines must be at least 1"));
        }
        if matches!(self.build_timeout, Some(t) if t.is_zero()) {
            return Err(ToolboxError::config("build timeout must be greater than zero"));
        }

        self.ignore_policy()?;
        Ok(self)
    }

    /// Absolute artifact path
    pub fn artifact_path(&self) -> PathBuf {
        if self.artifact.is_absolute() {
            self.artifact.clone()
        } else {
            self.project_root.join(&self.artifact)
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Ignore rules for this project, including the artifact itself
    pub fn ignore_policy(&self) -> ToolboxResult<IgnorePolicy> {
        IgnorePolicy::for_project(&self.project_root, &self.ignore, Some(&self.artifact_path()))
            .map_err(|e| ToolboxError::config(format!("ignore patterns: {}", e)))
    }

    pub fn deploy_options(&self) -> DeployOptions {
        let mut options = DeployOptions::new()
            .with_emulator_args(self.emulator_args.iter().cloned())
            .with_kill_timeout(self.kill_timeout)
            .with_command_timeout(self.build_timeout)
            .with_output_lines(self.output_lines);
        options.emulator = self.emulator.clone();
        options.deploy_command = self.deploy_command.clone();
        options.host = self.host.clone();
        options
    }
}
