//! Configuration module
//!
//! Precedence, highest first:
//! 1. CLI flags
//! 2. Environment variables (MCP2_*)
//! 3. User config (`~/.config/console-hax/mcp2-toolbox.yml`)
//! 4. Built-in defaults
//!
//! The merged `Config` is turned into immutable `WatchConfig` /
//! `DiscoveryConfig` values; nothing reads it globally.

mod loader;
#[cfg(test)]
mod tests;
mod types;

pub use loader::{default_config_path, ConfigWarning, CONFIG_RELATIVE_PATH};
pub use types::{ColorMode, Config, DiscoverySection, OutputConfig, WatchSection};
