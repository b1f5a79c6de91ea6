//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `WatchUseCase` - Watches a project and runs build + deploy cycles
//! - `WatchOrchestrator` - One cycle at a time, queueing requests while busy
//! - `DiscoveryService` - Keeps the device registry fresh
//!
//! ## Services
//!
//! - `BuildExecutor` - Runs the build command and classifies its exit
//! - `DeployLauncher` - Hands a fresh artifact to the emulator or hardware

pub mod build;
pub mod deploy;
pub mod discovery;
pub mod watch;

#[cfg(test)]
pub(crate) mod testing;

pub use build::BuildExecutor;
pub use deploy::{DeployError, DeployLauncher, DeployOptions, DeployOutcome};
pub use discovery::{
    AdvertisementError, DiscoveryConfig, DiscoveryListener, DiscoveryService, RegistryChange,
};
pub use watch::{
    CycleReport, StopReason, Submission, WatchConfig, WatchOrchestrator, WatchSummary,
    WatchUseCase,
};
