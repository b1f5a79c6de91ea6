//! Deploy Result
//!
//! Outcome and error types for one deploy attempt.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::ports::LaunchError;

/// What the deploy step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Emulator started with the fresh artifact
    Launched {
        pid: u32,
        /// Previous instances terminated first
        replaced: usize,
    },
    /// Hardware deploy command completed
    Uploaded { host: String },
    /// Nothing to do for this target
    Skipped,
}

impl fmt::Display for DeployOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployOutcome::Launched { pid, replaced: 0 } => {
                write!(f, "emulator started (pid {})", pid)
            }
            DeployOutcome::Launched { pid, replaced } => write!(
                f,
                "emulator restarted (pid {}, replaced {})",
                pid, replaced
            ),
            DeployOutcome::Uploaded { host } => write!(f, "deployed to {}", host),
            DeployOutcome::Skipped => write!(f, "deploy skipped (build only)"),
        }
    }
}

/// Why a deploy did not happen. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    #[error("artifact not found: {}", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("no emulator configured (set watch.emulator or pass --emulator)")]
    MissingEmulator,

    #[error("no deploy command configured (set watch.deploy_command)")]
    MissingDeployCommand,

    #[error("deploy command uses {{host}} but no host is configured")]
    MissingHost,

    #[error("could not stop previous emulator instance: {0}")]
    Terminate(#[source] LaunchError),

    #[error(transparent)]
    Launch(LaunchError),

    #[error("deploy command {reason}")]
    CommandFailed {
        reason: String,
        output_tail: Vec<String>,
    },
}

impl DeployError {
    /// Captured command output, when there is any
    pub fn output_tail(&self) -> &[String] {
        match self {
            DeployError::CommandFailed { output_tail, .. } => output_tail,
            _ => &[],
        }
    }
}
