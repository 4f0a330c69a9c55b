//! Async DNS resolver backed by hickory-resolver.

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use async_trait::async_trait;
use hickory_proto::xfer::Protocol;
use hickory_resolver::Resolver;
use hickory_resolver::config::{
    NameServerConfig, NameServerConfigGroup, ResolverConfig, ResolverOpts,
};
use hickory_resolver::name_server::TokioConnectionProvider;
use relaychain_config::{DnsConfig, DnsStrategy};
use tracing::debug;

use crate::NameResolver;
use crate::error::DnsError;

/// Shared caching DNS resolver.
///
/// Wraps `hickory_resolver::Resolver` with its TTL cache, configurable
/// UDP/TCP nameservers and `prefer_ipv4` ordering. Cheap to clone.
#[derive(Clone)]
pub struct DnsResolver {
    inner: Arc<Inner>,
}

struct Inner {
    resolver: Resolver<TokioConnectionProvider>,
    prefer_ipv4: bool,
}

impl std::fmt::Debug for DnsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsResolver")
            .field("prefer_ipv4", &self.inner.prefer_ipv4)
            .finish()
    }
}

impl DnsResolver {
    pub fn new(config: &DnsConfig) -> Result<Self, DnsError> {
        let resolver = match config.strategy {
            DnsStrategy::System => {
                let mut builder = Resolver::builder_tokio()
                    .map_err(|e| DnsError::InvalidServer(format!("system config: {e}")))?;
                let opts = builder.options_mut();
                opts.cache_size = config.cache_size;
                opts.preserve_intermediates = true;
                builder.build()
            }
            DnsStrategy::Custom => {
                let name_servers = parse_server_urls(&config.servers)?;
                let resolver_config = ResolverConfig::from_parts(None, vec![], name_servers);
                let mut opts = ResolverOpts::default();
                opts.cache_size = config.cache_size;
                opts.preserve_intermediates = true;
                let mut builder = Resolver::builder_with_config(
                    resolver_config,
                    TokioConnectionProvider::default(),
                );
                *builder.options_mut() = opts;
                builder.build()
            }
        };

        Ok(Self {
            inner: Arc::new(Inner {
                resolver,
                prefer_ipv4: config.prefer_ipv4,
            }),
        })
    }
}

#[async_trait]
impl NameResolver for DnsResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, DnsError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let response = self.inner.resolver.lookup_ip(host).await?;
        let mut ips: Vec<IpAddr> = response.iter().collect();
        if self.inner.prefer_ipv4 {
            // Stable: keeps the server's order within each family.
            ips.sort_by_key(|ip| !ip.is_ipv4());
        }
        if ips.is_empty() {
            return Err(DnsError::NoResults(host.to_string()));
        }
        debug!(host, resolved = ?ips, "dns resolved");
        Ok(ips)
    }
}

/// Parse `udp://` and `tcp://` server URLs into a nameserver group.
fn parse_server_urls(urls: &[String]) -> Result<NameServerConfigGroup, DnsError> {
    let mut configs = Vec::with_capacity(urls.len());

    for url in urls {
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| DnsError::InvalidServer(format!("missing scheme: {url}")))?;

        let protocol = match scheme {
            "udp" => Protocol::Udp,
            "tcp" => Protocol::Tcp,
            _ => {
                return Err(DnsError::InvalidServer(format!(
                    "unsupported protocol: {scheme}"
                )));
            }
        };
        if rest.contains('/') {
            return Err(DnsError::InvalidServer(format!(
                "unexpected path for {scheme} server: {url}"
            )));
        }
        let socket_addr = parse_socket_addr(rest, 53)?;
        configs.push(NameServerConfig::new(socket_addr, protocol));
    }

    if configs.is_empty() {
        return Err(DnsError::InvalidServer(
            "no dns servers configured".to_string(),
        ));
    }

    Ok(NameServerConfigGroup::from(configs))
}

/// Parse "host:port", "[ipv6]:port", "host", or "[ipv6]" with a default port.
fn parse_host_port(s: &str, default_port: u16) -> Result<(&str, u16), DnsError> {
    if let Some(rest) = s.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| DnsError::InvalidServer(format!("invalid IPv6 host in: {s}")))?;
        if host.is_empty() {
            return Err(DnsError::InvalidServer(format!("empty host in: {s}")));
        }
        if tail.is_empty() {
            return Ok((host, default_port));
        }
        let port = tail
            .strip_prefix(':')
            .and_then(|p| p.parse::<u16>().ok())
            .ok_or_else(|| DnsError::InvalidServer(format!("invalid port in: {s}")))?;
        return Ok((host, port));
    }

    if let Some((host, port_str)) = s.rsplit_once(':') {
        if host.contains(':') {
            return Err(DnsError::InvalidServer(format!(
                "ipv6 host must be bracketed in server url: {s}"
            )));
        }
        if host.is_empty() {
            return Err(DnsError::InvalidServer(format!("empty host in: {s}")));
        }
        let port = port_str
            .parse::<u16>()
            .map_err(|_| DnsError::InvalidServer(format!("invalid port in: {s}")))?;
        return Ok((host, port));
    }

    if s.is_empty() {
        return Err(DnsError::InvalidServer("empty host".to_string()));
    }
    Ok((s, default_port))
}

fn parse_socket_addr(s: &str, default_port: u16) -> Result<SocketAddr, DnsError> {
    if let Ok(sa) = s.parse::<SocketAddr>() {
        return Ok(sa);
    }

    let (host, port) = parse_host_port(s, default_port)?;
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    // Server hostnames are resolved once, at construction, by the system resolver.
    (host, port)
        .to_socket_addrs()
        .map_err(|e| {
            DnsError::InvalidServer(format!("failed to resolve dns server host '{host}': {e}"))
        })?
        .next()
        .ok_or_else(|| DnsError::InvalidServer(format!("dns server host has no addresses: {host}")))
}
