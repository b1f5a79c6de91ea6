//! Domain Entities
//!
//! Core domain entities that have identity and lifecycle.
//! - `ChangeEvent` - A raw filesystem notification
//! - `BuildCycle` - One build attempt and its outcome
//! - `Device` - A discovered network endpoint

mod build_cycle;
mod change_event;
mod device;

pub use build_cycle::{
    BuildCycle, BuildFailure, BuildOutcome, BuildStatus, CycleError, OutputTail,
    DEFAULT_OUTPUT_LINES,
};
pub use change_event::{ChangeEvent, ChangeKind};
pub use device::{Device, DeviceAdvertisement};
