//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `process/` - Process launcher (std::process, process groups, ps scan)
//! - `fs/` - Filesystem watcher (notify)
//! - `discovery/` - mDNS transport and hostname resolver
//! - `events/` - Event sinks (NDJSON)

pub mod discovery;
pub mod events;
pub mod fs;
pub mod process;

// Re-export for convenience
pub use discovery::{MdnsTransport, SystemResolver};
pub use events::JsonEventSink;
pub use fs::FsWatcher;
pub use process::SystemProcessLauncher;
