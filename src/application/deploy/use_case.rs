//! Deploy Launcher
//!
//! Loads a freshly built artifact onto the configured target.

use std::path::Path;

use crate::domain::ports::{ProcessExit, ProcessLauncher, ProcessSpec};
use crate::domain::value_objects::{CancelToken, DeployTarget, ProcessMatcher};

use super::options::DeployOptions;
use super::result::{DeployError, DeployOutcome};

/// Number of output lines attached to a failed deploy command
const FAILURE_TAIL_LINES: usize = 20;

pub struct DeployLauncher<L: ProcessLauncher> {
    launcher: L,
    options: DeployOptions,
    cancel: CancelToken,
}

impl<L: ProcessLauncher> DeployLauncher<L> {
    pub fn new(launcher: L, options: DeployOptions) -> Self {
        Self {
            launcher,
            options,
            cancel: CancelToken::new(),
        }
    }

    /// Stop flag checked while a deploy command runs
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn options(&self) -> &DeployOptions {
        &self.options
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Deploy `artifact` to `target`.
    ///
    /// Build-only never touches the artifact. Every other target checks the
    /// artifact exists before doing anything else.
    pub fn deploy(&self, artifact: &Path, target: DeployTarget) -> Result<DeployOutcome, DeployError> {
        if target == DeployTarget::BuildOnly {
            return Ok(DeployOutcome::Skipped);
        }

        if !artifact.is_file() {
            return Err(DeployError::MissingArtifact {
                path: artifact.to_path_buf(),
            });
        }

        match target {
            DeployTarget::Emulator => self.relaunch_emulator(artifact),
            DeployTarget::Hardware => self.run_deploy_command(artifact),
            DeployTarget::BuildOnly => Ok(DeployOutcome::Skipped),
        }
    }

    /// Kill any emulator already running this artifact, then start a new one
    fn relaunch_emulator(&self, artifact: &Path) -> Result<DeployOutcome, DeployError> {
        let emulator = self
            .options
            .emulator
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or(DeployError::MissingEmulator)?;

        let matcher = ProcessMatcher::new(emulator, artifact);
        let replaced = self
            .launcher
            .terminate_matching(&matcher, self.options.kill_timeout)
            .map_err(DeployError::Terminate)?;
        if replaced > 0 {
            tracing::debug!(replaced, pattern = %matcher.to_pattern(), "terminated previous emulator");
        }

        let spec = ProcessSpec::new(emulator)
            .args(self.options.emulator_args.iter().cloned())
            .arg(artifact.to_string_lossy());
        let pid = self
            .launcher
            .spawn_detached(&spec)
            .map_err(DeployError::Launch)?;

        tracing::info!(pid, artifact = %artifact.display(), "emulator launched");
        Ok(DeployOutcome::Launched { pid, replaced })
    }

    fn run_deploy_command(&self, artifact: &Path) -> Result<DeployOutcome, DeployError> {
        let template = self
            .options
            .deploy_command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or(DeployError::MissingDeployCommand)?;

        let host = self.options.host.as_deref().unwrap_or_default();
        if template.contains("{host}") && host.is_empty() {
            return Err(DeployError::MissingHost);
        }

        let command = render_command(template, artifact, host);
        let spec = ProcessSpec::shell(&command)
            .timeout(self.options.command_timeout)
            .output_lines(self.options.output_lines);

        let output = self
            .launcher
            .run(&spec, &self.cancel)
            .map_err(DeployError::Launch)?;

        let reason = match output.exit {
            ProcessExit::Code(0) => {
                return Ok(DeployOutcome::Uploaded {
                    host: if host.is_empty() {
                        "device".to_string()
                    } else {
                        host.to_string()
                    },
                })
            }
            ProcessExit::Code(code) => format!("exited with code {}", code),
            ProcessExit::Signaled => "terminated by signal".to_string(),
            ProcessExit::TimedOut { after } => format!("timed out after {}ms", after.as_millis()),
            ProcessExit::Cancelled => "cancelled".to_string(),
        };

        Err(DeployError::CommandFailed {
            reason,
            output_tail: output.output.last(FAILURE_TAIL_LINES),
        })
    }
}

/// Substitute `{elf}` and `{host}` in a deploy command template
pub fn render_command(template: &str, artifact: &Path, host: &str) -> String {
    template
        .replace("{elf}", &artifact.to_string_lossy())
        .replace("{host}", host)
}
