//! Name resolution for relaychain nodes.
//!
//! Nodes may name a resolver and a host table. Before the first node of a
//! route is dialed its address is mapped through them with
//! [`resolve_addr`]: a host-table hit wins, then the resolver, and with
//! neither the address is dialed as configured.

pub mod error;
pub mod hosts;
pub mod resolver;

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use relaychain_core::split_host_port;
use tracing::debug;

pub use error::DnsError;
pub use hosts::StaticHosts;
pub use resolver::DnsResolver;

/// Resolves a hostname to addresses.
#[async_trait]
pub trait NameResolver: Send + Sync + fmt::Debug {
    /// Returns at least one address on success.
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, DnsError>;
}

/// Static hostname mapping consulted before DNS.
pub trait HostMapper: Send + Sync + fmt::Debug {
    fn lookup(&self, host: &str) -> Option<Vec<IpAddr>>;
}

/// Map `addr` (`host:port`) to a dialable address.
///
/// IP hosts are returned as is. Otherwise the host table is consulted first,
/// then the resolver; the first address found is used. With neither
/// configured the address is returned unchanged.
pub async fn resolve_addr(
    addr: &str,
    hosts: Option<&dyn HostMapper>,
    resolver: Option<&dyn NameResolver>,
) -> Result<String, DnsError> {
    if hosts.is_none() && resolver.is_none() {
        return Ok(addr.to_string());
    }

    let (host, port) = split_host_port(addr)?;
    if host.parse::<IpAddr>().is_ok() {
        return Ok(addr.to_string());
    }

    if let Some(ip) = hosts
        .and_then(|h| h.lookup(host))
        .and_then(|ips| ips.into_iter().next())
    {
        debug!(host, %ip, "host mapped");
        return Ok(SocketAddr::new(ip, port).to_string());
    }

    if let Some(resolver) = resolver {
        let ip = resolver
            .resolve(host)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DnsError::NoResults(host.to_string()))?;
        return Ok(SocketAddr::new(ip, port).to_string());
    }

    Ok(addr.to_string())
}
