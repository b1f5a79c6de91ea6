//! Deploy target value object - where a successful build goes next

use serde::{Deserialize, Serialize};

/// Deploy target for a watch session.
///
/// - `Emulator`: (re)launch the configured emulator with the fresh artifact
/// - `Hardware`: run the configured deploy command against a device
/// - `BuildOnly`: just build, never deploy
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DeployTarget {
    /// Run in emulator
    #[default]
    Emulator,
    /// Push to real hardware
    #[serde(alias = "device")]
    Hardware,
    /// Build without deploying
    BuildOnly,
}

impl DeployTarget {
    pub fn display_name(&self) -> &'static str {
        match self {
            DeployTarget::Emulator => "Emulator",
            DeployTarget::Hardware => "Hardware",
            DeployTarget::BuildOnly => "Build only",
        }
    }

    /// Stable identifier used in JSON events
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployTarget::Emulator => "emulator",
            DeployTarget::Hardware => "hardware",
            DeployTarget::BuildOnly => "build-only",
        }
    }
}

impl std::fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
