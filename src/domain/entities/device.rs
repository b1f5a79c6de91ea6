//! Device entity - one discovered network endpoint
//!
//! Identity is the service instance name. Re-advertising the same name
//! refreshes the existing entry instead of creating a new one.

use std::collections::BTreeMap;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Normalized advertisement, ready to be merged into the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAdvertisement {
    pub id: String,
    pub address: IpAddr,
    pub port: u16,
    pub properties: BTreeMap<String, String>,
    pub service_type: Option<String>,
}

impl DeviceAdvertisement {
    pub fn new(id: impl Into<String>, address: IpAddr, port: u16) -> Self {
        Self {
            id: id.into(),
            address,
            port,
            properties: BTreeMap::new(),
            service_type: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = Some(service_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub id: String,
    pub address: IpAddr,
    pub port: u16,
    pub properties: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Device {
    /// First sighting: first-seen and last-seen are both `now`
    pub fn from_advertisement(ad: DeviceAdvertisement, now: DateTime<Utc>) -> Self {
        Self {
            id: ad.id,
            address: ad.address,
            port: ad.port,
            properties: ad.properties,
            service_type: ad.service_type,
            first_seen: now,
            last_seen: now,
        }
    }

    /// Merge a re-advertisement in place; first-seen is preserved
    pub fn refresh(&mut self, ad: DeviceAdvertisement, now: DateTime<Utc>) {
        self.address = ad.address;
        self.port = ad.port;
        self.properties = ad.properties;
        if ad.service_type.is_some() {
            self.service_type = ad.service_type;
        }
        self.last_seen = now;
    }

    /// Instance name without the `._service._proto.local.` suffix
    pub fn display_name(&self) -> &str {
        let trimmed = match &self.service_type {
            Some(service_type) => self
                .id
                .strip_suffix(service_type.as_str())
                .map(|s| s.trim_end_matches('.')),
            None => None,
        };
        match trimmed {
            Some(name) if !name.is_empty() => name,
            _ => self.id.as_str(),
        }
    }

    /// `ip` or `ip:port` when the port is not the HTTP default
    pub fn endpoint(&self) -> String {
        if self.port == 0 || self.port == 80 {
            self.address.to_string()
        } else {
            match self.address {
                IpAddr::V4(v4) => format!("{}:{}", v4, self.port),
                IpAddr::V6(v6) => format!("[{}]:{}", v6, self.port),
            }
        }
    }
}
