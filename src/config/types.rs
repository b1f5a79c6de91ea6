//! Configuration type definitions

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::deploy::DEFAULT_KILL_TIMEOUT;
use crate::application::discovery::{
    DiscoveryConfig, DEFAULT_BROWSE_DURATION, DEFAULT_SERVICE_TYPES, DEFAULT_SWEEP_INTERVAL,
};
use crate::application::watch::{WatchConfig, DEFAULT_BUILD_COMMAND};
use crate::domain::entities::DEFAULT_OUTPUT_LINES;
use crate::domain::services::{DEFAULT_QUIET_WINDOW, DEFAULT_STALENESS};
use crate::domain::value_objects::DeployTarget;
use crate::error::{ToolboxError, ToolboxResult};

use super::loader::{self, ConfigWarning};

/// `watch:` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSection {
    /// Project directory (current directory when unset)
    pub project: Option<PathBuf>,
    /// Built artifact, relative to the project
    pub elf: Option<PathBuf>,
    pub build_command: String,
    pub target: DeployTarget,
    pub emulator: Option<String>,
    pub emulator_args: Vec<String>,
    /// Hardware deploy command; `{elf}` and `{host}` are substituted
    pub deploy_command: Option<String>,
    pub host: Option<String>,
    pub quiet_window_ms: u64,
    pub build_timeout_secs: Option<u64>,
    pub kill_timeout_ms: u64,
    pub output_lines: usize,
    pub ignore: Vec<String>,
    pub build_on_start: bool,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            project: None,
            elf: None,
            build_command: DEFAULT_BUILD_COMMAND.to_string(),
            target: DeployTarget::default(),
            emulator: None,
            emulator_args: Vec::new(),
            deploy_command: None,
            host: None,
            quiet_window_ms: millis(DEFAULT_QUIET_WINDOW),
            build_timeout_secs: None,
            kill_timeout_ms: millis(DEFAULT_KILL_TIMEOUT),
            output_lines: DEFAULT_OUTPUT_LINES,
            ignore: Vec::new(),
            build_on_start: true,
        }
    }
}

/// `discovery:` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    pub service_types: Vec<String>,
    pub staleness_secs: u64,
    pub sweep_interval_ms: u64,
    pub browse_secs: u64,
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            service_types: DEFAULT_SERVICE_TYPES.iter().map(|s| s.to_string()).collect(),
            staleness_secs: DEFAULT_STALENESS.as_secs(),
            sweep_interval_ms: millis(DEFAULT_SWEEP_INTERVAL),
            browse_secs: DEFAULT_BROWSE_DURATION.as_secs(),
        }
    }
}

/// `output:` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub color: ColorMode,
    pub unicode: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: ColorMode::default(),
            unicode: true,
        }
    }
}

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub watch: WatchSection,
    pub discovery: DiscoverySection,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> ToolboxResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> ToolboxResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load the user config (defaults when absent) with env overrides applied
    pub fn load_or_default() -> ToolboxResult<(Self, Vec<ConfigWarning>)> {
        loader::load_or_default(loader::default_config_path().as_deref())
    }

    /// Apply environment variable overrides (MCP2_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    /// Watch settings; the project defaults to `cwd` and the artifact must be set
    pub fn watch_config(&self, cwd: &Path) -> ToolboxResult<WatchConfig> {
        let section = &self.watch;
        let elf = section
            .elf
            .clone()
            .ok_or_else(|| ToolboxError::config("no artifact configured (set watch.elf or pass --elf)"))?;
        let project = match &section.project {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => cwd.join(p),
            None => cwd.to_path_buf(),
        };

        Ok(WatchConfig::new(project, elf)
            .with_build_command(section.build_command.clone())
            .with_target(section.target)
            .with_emulator(section.emulator.clone())
            .with_emulator_args(section.emulator_args.clone())
            .with_deploy_command(section.deploy_command.clone())
            .with_host(section.host.clone())
            .with_quiet_window(Duration::from_millis(section.quiet_window_ms))
            .with_build_timeout(section.build_timeout_secs.map(Duration::from_secs))
            .with_kill_timeout(Duration::from_millis(section.kill_timeout_ms))
            .with_output_lines(section.output_lines)
            .with_ignore(section.ignore.clone())
            .with_build_on_start(section.build_on_start))
    }

    pub fn discovery_config(&self) -> DiscoveryConfig {
        let section = &self.discovery;
        DiscoveryConfig::default()
            .with_service_types(section.service_types.clone())
            .with_staleness(Duration::from_secs(section.staleness_secs))
            .with_sweep_interval(Duration::from_millis(section.sweep_interval_ms))
            .with_browse(Duration::from_secs(section.browse_secs))
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
