//! Watch Use Case
//!
//! Continuous watch-build-deploy. It orchestrates:
//! - Debouncing change events (300ms quiet window by default)
//! - Running the build command, one cycle at a time
//! - Deploying the artifact after a successful build
//!
//! ## Architecture
//!
//! - `WatchConfig` - Immutable, validated session settings
//! - `WatchOrchestrator` - State machine with the re-entrancy guard
//! - `WatchUseCase` - Single-owner loop over the change channel
//!
//! ## Usage
//!
//! ```ignore
//! let use_case = WatchUseCase::new(config, launcher, sink, cancel)?;
//! let summary = use_case.start(change_rx);
//! ```

mod options;
mod orchestrator;
mod use_case;


pub use options::{WatchConfig, DEFAULT_BUILD_COMMAND};
pub use orchestrator::{CycleReport, Submission, WatchOrchestrator, EVENT_TAIL_LINES};
pub use use_case::{StopReason, WatchSummary, WatchUseCase, POLL_INTERVAL};
