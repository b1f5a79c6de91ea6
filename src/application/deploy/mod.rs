//! Deploy Module
//!
//! Loads a successful build's artifact onto the configured target.
//!
//! ## Structure
//!
//! - `options` - Emulator path, deploy command template, timeouts (`DeployOptions`)
//! - `result` - `DeployOutcome` and `DeployError`
//! - `use_case` - `DeployLauncher`
//!
//! ## Usage
//!
//! ```ignore
//! let launcher = DeployLauncher::new(process_launcher, DeployOptions::new().with_emulator("pcsx2"));
//! let outcome = launcher.deploy(Path::new("build/app.elf"), DeployTarget::Emulator)?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::{DeployOptions, DEFAULT_KILL_TIMEOUT};
pub use result::{DeployError, DeployOutcome};
pub use use_case::{render_command, DeployLauncher};

#[cfg(test)]
mod tests;
