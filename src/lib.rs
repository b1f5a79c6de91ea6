//! mcp2-toolbox - watch, build, deploy and device discovery for console homebrew
//!
//! The core is the watch-build-deploy loop (`application::watch`) and the
//! device registry kept fresh by `application::discovery`. The binary is a
//! thin CLI around both.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use application::{
    DiscoveryConfig, DiscoveryService, WatchConfig, WatchOrchestrator, WatchSummary, WatchUseCase,
};
pub use config::Config;
pub use domain::entities::Device;
pub use domain::ports::{WatchEvent, WatchEventSink};
pub use domain::value_objects::{CancelToken, DeployTarget, WatchState};
pub use error::{ToolboxError, ToolboxResult};
