//! Device Registry
//!
//! Live set of discovered devices keyed by service instance name.
//! The registry owns the set exclusively; readers get cloned snapshots.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::entities::{Device, DeviceAdvertisement};

/// Devices not refreshed within this window are swept
pub const DEFAULT_STALENESS: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct Entry {
    device: Device,
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    devices: HashMap<String, Entry>,
    next_seq: u64,
}

/// Thread-safe device set
///
/// Writers are the discovery loop (advertise/remove/sweep); any thread may
/// take a snapshot concurrently.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    inner: RwLock<Inner>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new device or merge into the existing one.
    ///
    /// Returns `true` when the device was not known before.
    pub fn on_advertised(&self, ad: DeviceAdvertisement, now: DateTime<Utc>) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = inner.devices.get_mut(&ad.id) {
            entry.device.refresh(ad, now);
            return false;
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        let id = ad.id.clone();
        inner.devices.insert(
            id,
            Entry {
                device: Device::from_advertisement(ad, now),
                seq,
            },
        );
        true
    }

    /// Remove immediately. Returns whether the device was present.
    pub fn on_removed(&self, id: &str) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.devices.remove(id).is_some()
    }

    /// Point-in-time copy ordered by first-seen, insertion order on ties
    pub fn snapshot(&self) -> Vec<Device> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<&Entry> = inner.devices.values().collect();
        entries.sort_by(|a, b| {
            a.device
                .first_seen
                .cmp(&b.device.first_seen)
                .then(a.seq.cmp(&b.seq))
        });
        entries.into_iter().map(|e| e.device.clone()).collect()
    }

    /// Remove devices whose last-seen is older than `window` before `now`.
    ///
    /// Returns the removed devices.
    pub fn sweep_stale(&self, now: DateTime<Utc>, window: Duration) -> Vec<Device> {
        let window = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
        let cutoff = now.checked_sub_signed(window);

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let stale: Vec<String> = match cutoff {
            Some(cutoff) => inner
                .devices
                .iter()
                .filter(|(_, e)| e.device.last_seen < cutoff)
                .map(|(id, _)| id.clone())
                .collect(),
            None => Vec::new(),
        };

        let mut removed: Vec<Entry> = stale
            .iter()
            .filter_map(|id| inner.devices.remove(id))
            .collect();
        removed.sort_by_key(|e| e.seq);
        removed.into_iter().map(|e| e.device).collect()
    }

    pub fn get(&self, id: &str) -> Option<Device> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.devices.get(id).map(|e| e.device.clone())
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
