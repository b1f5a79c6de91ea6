//! Deploy Options
//!
//! Everything the deploy step needs besides the artifact itself.

use std::time::Duration;

/// Default bound on waiting for a previous emulator instance to exit
pub const DEFAULT_KILL_TIMEOUT: Duration = Duration::from_secs(2);

/// Options for the deploy launcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Emulator executable (required for the emulator target)
    pub emulator: Option<String>,
    /// Extra emulator arguments placed before the artifact path
    pub emulator_args: Vec<String>,
    /// Shell command template for the hardware target (`{elf}`, `{host}`)
    pub deploy_command: Option<String>,
    /// Device address substituted for `{host}`
    pub host: Option<String>,
    /// Bound on terminating a previous emulator instance
    pub kill_timeout: Duration,
    /// Bound on the hardware deploy command
    pub command_timeout: Option<Duration>,
    /// Lines of deploy command output kept for diagnostics
    pub output_lines: usize,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            emulator: None,
            emulator_args: Vec::new(),
            deploy_command: None,
            host: None,
            kill_timeout: DEFAULT_KILL_TIMEOUT,
            command_timeout: None,
            output_lines: crate::domain::entities::DEFAULT_OUTPUT_LINES,
        }
    }
}

impl DeployOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_emulator(mut self, emulator: impl Into<String>) -> Self {
        self.emulator = Some(emulator.into());
        self
    }

    pub fn with_emulator_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emulator_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_deploy_command(mut self, command: impl Into<String>) -> Self {
        self.deploy_command = Some(command.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_kill_timeout(mut self, timeout: Duration) -> Self {
        self.kill_timeout = timeout;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_output_lines(mut self, lines: usize) -> Self {
        self.output_lines = lines;
        self
    }
}
