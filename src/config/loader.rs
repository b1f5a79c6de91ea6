//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::DeployTarget;
use crate::error::{ToolboxError, ToolboxResult};

use super::types::{ColorMode, Config};

/// Config file location below the platform config directory
pub const CONFIG_RELATIVE_PATH: &str = "console-hax/mcp2-toolbox.yml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> ToolboxResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;
    parse_with_warnings(&content, path)
}

pub(crate) fn parse_with_warnings(
    content: &str,
    path: &Path,
) -> ToolboxResult<(Config, Vec<ConfigWarning>)> {
    // An empty YAML document is a valid, empty config
    if content.trim().is_empty() {
        return Ok((Config::default(), Vec::new()));
    }

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = serde_yaml_ng::Deserializer::from_str(content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ToolboxError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(content, &key),
                suggestion: suggest_key(&key),
                key,
                file: path.to_path_buf(),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load from `path` if it exists, otherwise defaults; env overrides on top
pub fn load_or_default(path: Option<&Path>) -> ToolboxResult<(Config, Vec<ConfigWarning>)> {
    let (config, warnings) = match path {
        Some(path) if path.exists() => {
            tracing::debug!(path = %path.display(), "loading config");
            load_with_warnings(path)?
        }
        _ => (Config::default(), Vec::new()),
    };
    Ok((with_env_overrides(config), warnings))
}

/// `$XDG_CONFIG_HOME/console-hax/mcp2-toolbox.yml`, or the platform default
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .map(|dir| dir.join(CONFIG_RELATIVE_PATH))
}

/// Apply environment variable overrides (MCP2_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    apply_overrides(config, |name| std::env::var(name).ok())
}

pub(crate) fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(project) = var("MCP2_PROJECT") {
        config.watch.project = Some(PathBuf::from(project));
    }
    if let Some(elf) = var("MCP2_ELF") {
        config.watch.elf = Some(PathBuf::from(elf));
    }
    if let Some(build) = var("MCP2_BUILD") {
        config.watch.build_command = build;
    }
    if let Some(emulator) = var("MCP2_EMULATOR") {
        config.watch.emulator = Some(emulator);
    }
    if let Some(host) = var("MCP2_HOST") {
        config.watch.host = Some(host);
    }

    // MCP2_TARGET
    if let Some(target) = var("MCP2_TARGET") {
        match target.trim().to_lowercase().as_str() {
            "emulator" => config.watch.target = DeployTarget::Emulator,
            "hardware" | "device" => config.watch.target = DeployTarget::Hardware,
            "build-only" | "build" => config.watch.target = DeployTarget::BuildOnly,
            other => tracing::warn!(value = other, "ignoring unknown MCP2_TARGET"),
        }
    }

    // MCP2_QUIET_MS
    if let Some(ms) = var("MCP2_QUIET_MS") {
        match ms.trim().parse() {
            Ok(ms) => config.watch.quiet_window_ms = ms,
            Err(_) => tracing::warn!(value = %ms, "ignoring non-numeric MCP2_QUIET_MS"),
        }
    }

    // MCP2_COLOR
    if let Some(color) = var("MCP2_COLOR") {
        config.output.color = match color.to_lowercase().as_str() {
            "always" => ColorMode::Always,
            "never" => ColorMode::Never,
            _ => ColorMode::Auto,
        };
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.trim_start().starts_with(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "watch",
        "project",
        "elf",
        "build_command",
        "target",
        "emulator",
        "emulator_args",
        "deploy_command",
        "host",
        "quiet_window_ms",
        "build_timeout_secs",
        "kill_timeout_ms",
        "output_lines",
        "ignore",
        "build_on_start",
        "discovery",
        "service_types",
        "staleness_secs",
        "sweep_interval_ms",
        "browse_secs",
        "output",
        "color",
        "unicode",
    ];

    CANDIDATES
        .iter()
        .map(|candidate| (*candidate, levenshtein(unknown, candidate)))
        .min_by_key(|(_, dist)| *dist)
        .filter(|(_, dist)| *dist <= 2)
        .map(|(candidate, _)| candidate.to_string())
}

/// Edit distance over chars, one rolling row
fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitute = diagonal + usize::from(ca != *cb);
            diagonal = row[j + 1];
            row[j + 1] = substitute.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[b.len()]
}

#[cfg(test)]
pub(crate) fn distance(a: &str, b: &str) -> usize {
    levenshtein(a, b)
}
