//! mDNS Transport
//!
//! `DiscoveryTransport` backed by `mdns-sd`. One browse thread per service
//! type converts resolved/removed services into raw discovery events.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};

use crate::domain::ports::{DiscoveryError, DiscoveryTransport, RawAdvertisement, RawDiscoveryEvent};

/// How often browse threads check the stop flag
const RECV_POLL: Duration = Duration::from_millis(100);

#[derive(Default)]
pub struct MdnsTransport {
    daemon: Option<ServiceDaemon>,
    service_types: Vec<String>,
    halted: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
}

impl MdnsTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// One forwarding thread per service type
    fn browse_all(
        &mut self,
        daemon: &ServiceDaemon,
        service_types: &[String],
        events: &SyncSender<RawDiscoveryEvent>,
    ) -> Result<(), DiscoveryError> {
        for service_type in service_types {
            let receiver = daemon
                .browse(service_type)
                .map_err(|e| DiscoveryError::Mdns(format!("{}: {}", service_type, e)))?;
            self.service_types.push(service_type.clone());
            let events = events.clone();
            let halted = Arc::clone(&self.halted);
            let service_type = service_type.clone();

            self.threads.push(std::thread::spawn(move || {
                while !halted.load(Ordering::SeqCst) {
                    let event = match receiver.recv_timeout(RECV_POLL) {
                        Ok(event) => event,
                        Err(_) if receiver.is_disconnected() => break,
                        Err(_) => continue,
                    };
                    let raw = match event {
                        ServiceEvent::ServiceResolved(info) => {
                            RawDiscoveryEvent::Advertised(to_raw(&info, &service_type))
                        }
                        ServiceEvent::ServiceRemoved(_, fullname) => {
                            RawDiscoveryEvent::Removed { id: fullname }
                        }
                        other => {
                            tracing::trace!(?other, "mdns event");
                            continue;
                        }
                    };
                    if events.send(raw).is_err() {
                        break;
                    }
                }
            }));
        }
        Ok(())
    }
}

impl DiscoveryTransport for MdnsTransport {
    fn start(
        &mut self,
        service_types: &[String],
        events: SyncSender<RawDiscoveryEvent>,
    ) -> Result<(), DiscoveryError> {
        self.stop();
        let daemon = ServiceDaemon::new().map_err(|e| DiscoveryError::Mdns(e.to_string()))?;
        self.halted = Arc::new(AtomicBool::new(false));

        let browsing = self.browse_all(&daemon, service_types, &events);
        self.daemon = Some(daemon);
        if browsing.is_err() {
            self.stop();
        }
        browsing
    }

    fn stop(&mut self) {
        self.halted.store(true, Ordering::SeqCst);
        if let Some(daemon) = self.daemon.take() {
            for service_type in self.service_types.drain(..) {
                let _ = daemon.stop_browse(&service_type);
            }
            if let Err(err) = daemon.shutdown() {
                tracing::debug!(error = %err, "mdns daemon shutdown");
            }
        }
        for thread in self.threads.drain(..) {
            let _ = thread.join();
        }
    }
}

impl Drop for MdnsTransport {
    fn drop(&mut self) {
        self.stop();
    }
}

fn to_raw(info: &ServiceInfo, service_type: &str) -> RawAdvertisement {
    let properties: BTreeMap<String, String> = info
        .get_properties()
        .iter()
        .map(|p| (p.key().to_string(), p.val_str().to_string()))
        .collect();

    let mut addresses: Vec<_> = info.get_addresses().iter().copied().collect();
    addresses.sort();

    let hostname = info.get_hostname();
    RawAdvertisement {
        id: info.get_fullname().to_string(),
        hostname: (!hostname.is_empty()).then(|| hostname.to_string()),
        addresses,
        port: info.get_port(),
        properties,
        service_type: Some(service_type.to_string()),
    }
}
