//! Discovery configuration

use std::time::Duration;

use crate::domain::services::DEFAULT_STALENESS;
use crate::error::{ToolboxError, ToolboxResult};

/// Service types browsed when none are configured
pub const DEFAULT_SERVICE_TYPES: &[&str] = &["_http._tcp.local.", "_memcardpro._tcp.local."];

/// How often stale devices are swept
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// How long one-shot commands (`list`, `ui`) browse before answering
pub const DEFAULT_BROWSE_DURATION: Duration = Duration::from_secs(2);

/// Immutable discovery settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub service_types: Vec<String>,
    pub staleness: Duration,
    pub sweep_interval: Duration,
    pub browse: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            service_types: DEFAULT_SERVICE_TYPES.iter().map(|s| s.to_string()).collect(),
            staleness: DEFAULT_STALENESS,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            browse: DEFAULT_BROWSE_DURATION,
        }
    }
}

impl DiscoveryConfig {
    pub fn with_service_types(mut self, service_types: Vec<String>) -> Self {
        self.service_types = service_types;
        self
    }

    pub fn with_staleness(mut self, staleness: Duration) -> Self {
        self.staleness = staleness;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_browse(mut self, browse: Duration) -> Self {
        self.browse = browse;
        self
    }

    /// Service types must be fully qualified (`_name._tcp.local.`)
    pub fn validate(self) -> ToolboxResult<Self> {
        if self.service_types.is_empty() {
            return Err(ToolboxError::config("discovery.service_types must not be empty"));
        }
        for ty in &self.service_types {
            if !ty.starts_with('_') || !ty.ends_with(".local.") {
                return Err(ToolboxError::config(format!(
                    "invalid service type '{}': expected e.g. '_http._tcp.local.'",
                    ty
                )));
            }
        }
        if self.sweep_interval.is_zero() {
            return Err(ToolboxError::config("discovery.sweep_interval_ms must be greater than zero"));
        }
        Ok(self)
    }
}
