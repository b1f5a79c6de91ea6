//! Discovery Use Case
//!
//! Keeps a live registry of network devices advertised over mDNS.
//!
//! - `DiscoveryListener` - normalizes raw advertisements into registry updates
//! - `DiscoveryService` - single-owner loop with periodic stale sweeps

mod listener;
mod options;
mod service;


pub use listener::{AdvertisementError, DiscoveryListener, RegistryChange};
pub use options::{
    DiscoveryConfig, DEFAULT_BROWSE_DURATION, DEFAULT_SERVICE_TYPES, DEFAULT_SWEEP_INTERVAL,
};
pub use service::{DiscoveryService, EVENT_CHANNEL_CAPACITY};
