//! Discovery Ports
//!
//! The network discovery transport delivers raw advertisement and removal
//! events onto a bounded channel; the listener normalizes them. Delivery is
//! at-least-once, so every consumer must treat re-advertisement as idempotent.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::mpsc::SyncSender;

use thiserror::Error;

/// An advertisement as the transport saw it, before normalization
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawAdvertisement {
    pub id: String,
    pub hostname: Option<String>,
    pub addresses: Vec<IpAddr>,
    pub port: u16,
    pub properties: BTreeMap<String, String>,
    pub service_type: Option<String>,
}

impl RawAdvertisement {
    pub fn new(id: impl Into<String>, port: u16) -> Self {
        Self {
            id: id.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_address(mut self, address: IpAddr) -> Self {
        self.addresses.push(address);
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = Some(service_type.into());
        self
    }
}

/// Event kinds the transport delivers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDiscoveryEvent {
    Advertised(RawAdvertisement),
    Removed { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("mDNS error: {0}")]
    Mdns(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Source of advertisement events for a set of service types
pub trait DiscoveryTransport: Send {
    /// Start browsing; events are pushed to `events` until `stop` is called
    /// or the receiving side is dropped.
    fn start(
        &mut self,
        service_types: &[String],
        events: SyncSender<RawDiscoveryEvent>,
    ) -> Result<(), DiscoveryError>;

    /// Stop browsing and release network resources. Idempotent.
    fn stop(&mut self);
}

/// Hostname to address resolution, for advertisements that carry no address
pub trait HostResolver: Send + Sync {
    fn resolve(&self, hostname: &str, port: u16) -> Option<IpAddr>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn raw_advertisement_builder() {
        let ad = RawAdvertisement::new("dev-1", 21)
            .with_address(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)))
            .with_property("a", "1")
            .with_service_type("_http._tcp.local.");
        assert_eq!(ad.addresses.len(), 1);
        assert_eq!(ad.properties.get("a").map(String::as_str), Some("1"));
        assert!(ad.hostname.is_none());
    }
}
