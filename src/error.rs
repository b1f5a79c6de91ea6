//! Error types for mcp2-toolbox
//!
//! Library errors use `thiserror`. Only configuration errors are fatal; build,
//! deploy and discovery failures are reported as events and never bubble up
//! through the watch loop.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for toolbox operations
pub type ToolboxResult<T> = Result<T, ToolboxError>;

/// Main error type for toolbox operations
#[derive(Error, Debug)]
pub enum ToolboxError {
    /// Invalid or missing configuration value
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Project root missing or not a directory
    #[error("project root '{path}' does not exist or is not a directory")]
    InvalidProjectRoot { path: PathBuf },

    /// Config file could not be parsed
    #[error("invalid config file {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Filesystem watcher could not be set up
    #[error("file watcher error: {0}")]
    Watch(String),

    /// Discovery transport could not be started
    #[error("discovery error: {0}")]
    Discovery(String),

    /// Device selection or addressing problem
    #[error("device error: {0}")]
    Device(String),
}

impl ToolboxError {
    /// Build a configuration error from any displayable message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error must abort the process at startup
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::InvalidProjectRoot { .. } | Self::InvalidConfig { .. }
        )
    }
}

impl From<notify::Error> for ToolboxError {
    fn from(err: notify::Error) -> Self {
        Self::Watch(err.to_string())
    }
}
