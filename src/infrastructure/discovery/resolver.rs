//! Hostname resolution through the system resolver

use std::net::{IpAddr, ToSocketAddrs};

use crate::domain::ports::HostResolver;

/// Resolves via `getaddrinfo`, preferring IPv4
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn resolve(&self, hostname: &str, port: u16) -> Option<IpAddr> {
        let host = hostname.trim_end_matches('.');
        if host.is_empty() {
            return None;
        }
        let addrs: Vec<IpAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|e| tracing::debug!(host, error = %e, "hostname did not resolve"))
            .ok()?
            .map(|a| a.ip())
            .collect();
        addrs
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
    }
}
