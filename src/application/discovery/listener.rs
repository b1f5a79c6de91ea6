//! Discovery Listener
//!
//! Normalizes raw transport events and applies them to the registry.
//! A malformed advertisement is logged and dropped; it never stops the
//! listener.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::entities::DeviceAdvertisement;
use crate::domain::ports::{HostResolver, RawAdvertisement, RawDiscoveryEvent};
use crate::domain::services::DeviceRegistry;

/// Advertisement that cannot become a device
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvertisementError {
    #[error("advertisement has an empty instance name")]
    EmptyId,

    #[error("advertisement '{id}' carries no address and no hostname")]
    NoAddress { id: String },

    #[error("advertisement '{id}': hostname '{hostname}' did not resolve")]
    Unresolvable { id: String, hostname: String },
}

/// Effect of one event on the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryChange {
    Added(String),
    Updated(String),
    Removed(String),
    /// Removal of a device that was not known
    Unknown(String),
    /// Malformed advertisement, dropped
    Dropped(AdvertisementError),
}

pub struct DiscoveryListener {
    registry: Arc<DeviceRegistry>,
    resolver: Option<Arc<dyn HostResolver>>,
}

impl DiscoveryListener {
    pub fn new(registry: Arc<DeviceRegistry>) -> Self {
        Self {
            registry,
            resolver: None,
        }
    }

    /// Resolve hostnames for advertisements that carry no address
    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    pub fn handle(&self, event: RawDiscoveryEvent, now: DateTime<Utc>) -> RegistryChange {
        match event {
            RawDiscoveryEvent::Advertised(raw) => match self.normalize(raw) {
                Ok(ad) => {
                    let id = ad.id.clone();
                    if self.registry.on_advertised(ad, now) {
                        tracing::debug!(device = %id, "device added");
                        RegistryChange::Added(id)
                    } else {
                        RegistryChange::Updated(id)
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "dropping malformed advertisement");
                    RegistryChange::Dropped(err)
                }
            },
            RawDiscoveryEvent::Removed { id } => {
                if self.registry.on_removed(&id) {
                    tracing::debug!(device = %id, "device removed");
                    RegistryChange::Removed(id)
                } else {
                    RegistryChange::Unknown(id)
                }
            }
        }
    }

    /// Pick one address (IPv4 first), falling back to hostname resolution
    pub fn normalize(&self, raw: RawAdvertisement) -> Result<DeviceAdvertisement, AdvertisementError> {
        let id = raw.id.trim().to_string();
        if id.is_empty() {
            return Err(AdvertisementError::EmptyId);
        }

        let address = match preferred_address(&raw.addresses) {
            Some(address) => address,
            None => {
                let hostname = raw
                    .hostname
                    .as_deref()
                    .filter(|h| !h.is_empty())
                    .ok_or_else(|| AdvertisementError::NoAddress { id: id.clone() })?;
                self.resolver
                    .as_ref()
                    .and_then(|r| r.resolve(hostname, raw.port))
                    .ok_or_else(|| AdvertisementError::Unresolvable {
                        id: id.clone(),
                        hostname: hostname.to_string(),
                    })?
            }
        };

        let mut ad = DeviceAdvertisement::new(id, address, raw.port).with_properties(raw.properties);
        if let Some(service_type) = raw.service_type {
            ad = ad.with_service_type(service_type);
        }
        Ok(ad)
    }
}

/// IPv4 before IPv6, and the smallest address within a family so the
/// choice is stable across re-advertisements
fn preferred_address(addresses: &[IpAddr]) -> Option<IpAddr> {
    addresses
        .iter()
        .filter(|a| a.is_ipv4())
        .min()
        .or_else(|| addresses.iter().min())
        .copied()
}
