//! Discovery Service
//!
//! Owns the discovery loop: one thread receives transport events, applies
//! them through the listener and sweeps stale devices on a fixed interval.
//! Readers only ever see registry snapshots.

use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::domain::entities::Device;
use crate::domain::ports::{DiscoveryTransport, HostResolver, RawDiscoveryEvent};
use crate::domain::services::DeviceRegistry;
use crate::domain::value_objects::CancelToken;
use crate::error::{ToolboxError, ToolboxResult};

use super::listener::DiscoveryListener;
use super::options::DiscoveryConfig;

/// Bound on queued transport events
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Upper bound on one receive wait, so a stop request is noticed promptly
const MAX_WAIT: Duration = Duration::from_millis(100);

pub struct DiscoveryService {
    config: DiscoveryConfig,
    listener: DiscoveryListener,
}

impl DiscoveryService {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self {
            config,
            listener: DiscoveryListener::new(Arc::new(DeviceRegistry::new())),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.listener = self.listener.with_resolver(resolver);
        self
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Shared handle for snapshot readers on other threads
    pub fn registry(&self) -> Arc<DeviceRegistry> {
        Arc::clone(self.listener.registry())
    }

    pub fn snapshot(&self) -> Vec<Device> {
        self.listener.registry().snapshot()
    }

    /// Browse for `duration`, or until `cancel` is set, then return what was
    /// found
    pub fn discover_for(
        &self,
        transport: &mut dyn DiscoveryTransport,
        duration: Duration,
        cancel: &CancelToken,
    ) -> ToolboxResult<Vec<Device>> {
        let deadline = Instant::now() + duration;
        self.run_until(transport, cancel, Some(deadline))?;
        Ok(self.snapshot())
    }

    /// Browse until `cancel` is set or the transport closes its channel
    pub fn run(&self, transport: &mut dyn DiscoveryTransport, cancel: &CancelToken) -> ToolboxResult<()> {
        self.run_until(transport, cancel, None)
    }

    fn run_until(
        &self,
        transport: &mut dyn DiscoveryTransport,
        cancel: &CancelToken,
        deadline: Option<Instant>,
    ) -> ToolboxResult<()> {
        let (tx, rx) = sync_channel(EVENT_CHANNEL_CAPACITY);
        transport
            .start(&self.config.service_types, tx)
            .map_err(|e| ToolboxError::Discovery(e.to_string()))?;
        tracing::debug!(service_types = ?self.config.service_types, "discovery started");

        self.pump(&rx, cancel, deadline);
        transport.stop();
        Ok(())
    }

    fn pump(&self, rx: &Receiver<RawDiscoveryEvent>, cancel: &CancelToken, deadline: Option<Instant>) {
        let mut next_sweep = Instant::now() + self.config.sweep_interval;

        loop {
            if cancel.is_cancelled() {
                break;
            }
            let now = Instant::now();
            if deadline.is_some_and(|d| now >= d) {
                break;
            }

            let mut wait = next_sweep.saturating_duration_since(now).min(MAX_WAIT);
            if let Some(deadline) = deadline {
                wait = wait.min(deadline.saturating_duration_since(now));
            }

            match rx.recv_timeout(wait) {
                Ok(event) => {
                    self.listener.handle(event, Utc::now());
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("discovery transport closed");
                    break;
                }
            }

            if Instant::now() >= next_sweep {
                let removed = self
                    .listener
                    .registry()
                    .sweep_stale(Utc::now(), self.config.staleness);
                for device in &removed {
                    tracing::debug!(device = %device.id, "device expired");
                }
                next_sweep = Instant::now() + self.config.sweep_interval;
            }
        }
    }
}
