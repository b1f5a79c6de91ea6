//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod discovery;
pub mod process_launcher;
pub mod watch_events;

pub use discovery::{
    DiscoveryError, DiscoveryTransport, HostResolver, RawAdvertisement, RawDiscoveryEvent,
};
pub use process_launcher::{
    LaunchError, ProcessExit, ProcessLauncher, ProcessOutput, ProcessSpec,
};
pub use watch_events::{NoopEventSink, WatchEvent, WatchEventSink};
