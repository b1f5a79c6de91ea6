//! Domain Services
//!
//! Pure logic over domain entities. No I/O: time is passed in explicitly,
//! so these services are driven deterministically in tests.

mod debouncer;
mod registry;

pub use debouncer::{BuildRequest, Debouncer, DEFAULT_QUIET_WINDOW};
pub use registry::{DeviceRegistry, DEFAULT_STALENESS};
