//! Configuration type definitions for chains, hops, nodes, bypasses,
//! resolvers, host mappings and logging.

use std::collections::HashMap;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::defaults::*;
use crate::metadata::Metadata;

/// A named multi-hop chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub name: String,
    /// Chain-level selector, used by hops that do not set their own.
    #[serde(default)]
    pub selector: Option<SelectorConfig>,
    /// Ordered hops. Traversal follows this order.
    #[serde(default)]
    pub hops: Vec<HopConfig>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// One stage of a chain: a group of candidate nodes plus defaults that
/// nodes inherit when they leave a field unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HopConfig {
    pub name: String,
    #[serde(default)]
    pub selector: Option<SelectorConfig>,
    /// Single bypass reference, combined with `bypasses`.
    #[serde(default)]
    pub bypass: Option<String>,
    #[serde(default)]
    pub bypasses: Vec<String>,
    #[serde(default)]
    pub resolver: Option<String>,
    #[serde(default)]
    pub hosts: Option<String>,
    /// Network interface to bind outbound sockets to.
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub sockopts: Option<SockOptsConfig>,
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}

/// A single proxy endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: String,
    /// Dial address (host:port).
    pub addr: String,
    #[serde(default)]
    pub connector: ConnectorConfig,
    #[serde(default)]
    pub dialer: DialerConfig,
    #[serde(default)]
    pub resolver: Option<String>,
    #[serde(default)]
    pub hosts: Option<String>,
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub sockopts: Option<SockOptsConfig>,
    #[serde(default)]
    pub bypass: Option<String>,
    #[serde(default)]
    pub bypasses: Vec<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl NodeConfig {
    /// A node with default connector/dialer and no overrides.
    pub fn new(name: impl Into<String>, addr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addr: addr.into(),
            connector: ConnectorConfig::default(),
            dialer: DialerConfig::default(),
            resolver: None,
            hosts: None,
            interface: None,
            sockopts: None,
            bypass: None,
            bypasses: Vec::new(),
            metadata: None,
        }
    }
}

/// Protocol layer of a node (what is spoken over the dialed stream).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    #[serde(rename = "type", default = "default_connector_type")]
    pub kind: String,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub tls: Option<TlsConfig>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl ConnectorConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            auth: None,
            tls: None,
            metadata: None,
        }
    }
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self::new(default_connector_type())
    }
}

/// Network layer of a node (how the stream to the node is established).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialerConfig {
    #[serde(rename = "type", default = "default_dialer_type")]
    pub kind: String,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub tls: Option<TlsConfig>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl DialerConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            auth: None,
            tls: None,
            metadata: None,
        }
    }
}

impl Default for DialerConfig {
    fn default() -> Self {
        Self::new(default_dialer_type())
    }
}

/// Client TLS material. Empty strings mean "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    #[serde(default)]
    pub cert_file: String,
    #[serde(default)]
    pub key_file: String,
    #[serde(default)]
    pub ca_file: String,
    /// Verify the server certificate.
    #[serde(default)]
    pub secure: bool,
    /// Name used for SNI and certificate verification.
    #[serde(default)]
    pub server_name: String,
}

/// Credentials presented to a proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Socket options applied to outbound sockets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SockOptsConfig {
    /// SO_MARK routing mark (Linux only).
    #[serde(default)]
    pub mark: u32,
}

/// Node selection policy for a hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// round | random | fifo | hash. Empty means "not specified".
    #[serde(default)]
    pub strategy: String,
    /// Failures before a node is skipped (0 disables the fail filter).
    #[serde(default = "default_max_fails")]
    pub max_fails: u32,
    /// How long a failed node stays skipped, in seconds.
    #[serde(default = "default_fail_timeout_secs")]
    pub fail_timeout_secs: u64,
}

impl SelectorConfig {
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            max_fails: default_max_fails(),
            fail_timeout_secs: default_fail_timeout_secs(),
        }
    }
}

/// A named bypass rule set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BypassConfig {
    pub name: String,
    /// Invert the match: only listed addresses are proxied.
    #[serde(default, alias = "whitelist")]
    pub reverse: bool,
    /// IP, CIDR, domain, `.suffix`, `*.suffix` or `keyword:text` patterns.
    #[serde(default)]
    pub matchers: Vec<String>,
}

/// A named DNS resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub name: String,
    #[serde(flatten)]
    pub dns: DnsConfig,
}

/// DNS resolver settings.
///
/// When fields are omitted, the system resolver with caching is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsConfig {
    /// - `"system"` (default): reads `/etc/resolv.conf` on Unix, system
    ///   DNS settings on Windows.
    /// - `"custom"`: uses the nameservers listed in `servers`.
    #[serde(default)]
    pub strategy: DnsStrategy,

    /// Custom nameserver URLs: `udp://8.8.8.8`, `tcp://8.8.8.8:53`.
    /// Only used when `strategy = "custom"`.
    #[serde(default)]
    pub servers: Vec<String>,

    /// Prefer IPv4 addresses when both A and AAAA records exist.
    #[serde(default)]
    pub prefer_ipv4: bool,

    /// DNS cache capacity (number of entries). Set to 0 to disable caching.
    #[serde(default = "default_dns_cache_size")]
    pub cache_size: usize,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            strategy: DnsStrategy::default(),
            servers: Vec::new(),
            prefer_ipv4: false,
            cache_size: default_dns_cache_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DnsStrategy {
    #[default]
    System,
    Custom,
}

/// A named static host table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostsConfig {
    pub name: String,
    #[serde(default)]
    pub mappings: Vec<HostMappingConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMappingConfig {
    pub ip: IpAddr,
    pub hostname: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: Option<String>,
    /// Log format: json, pretty, or compact. Default: pretty.
    pub format: Option<String>,
    /// Output target: stdout or stderr. Default: stderr.
    pub output: Option<String>,
    /// Per-module log level filters (e.g., {"relaychain_chain": "debug", "rustls": "warn"}).
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_defaults() {
        let node: NodeConfig = serde_yaml::from_str("name: a\naddr: 1.2.3.4:80").unwrap();
        assert_eq!(node.connector.kind, "http");
        assert_eq!(node.dialer.kind, "tcp");
        assert!(node.sockopts.is_none());
        assert!(node.bypasses.is_empty());
        assert_eq!(node, NodeConfig::new("a", "1.2.3.4:80"));
    }

    #[test]
    fn selector_defaults() {
        let sel: SelectorConfig = serde_yaml::from_str("strategy: fifo").unwrap();
        assert_eq!(sel.max_fails, 1);
        assert_eq!(sel.fail_timeout_secs, 10);
        assert_eq!(sel, SelectorConfig::new("fifo"));
    }

    #[test]
    fn bypass_whitelist_alias() {
        let b: BypassConfig =
            serde_yaml::from_str("name: wl\nwhitelist: true\nmatchers: [example.com]").unwrap();
        assert!(b.reverse);
        assert_eq!(b.matchers, vec!["example.com"]);
    }

    #[test]
    fn resolver_flattens_dns_settings() {
        let r: ResolverConfig = toml::from_str(
            r#"
name = "google"
strategy = "custom"
servers = ["udp://8.8.8.8"]
"#,
        )
        .unwrap();
        assert_eq!(r.dns.strategy, DnsStrategy::Custom);
        assert_eq!(r.dns.cache_size, 256);
        assert!(!r.dns.prefer_ipv4);
    }

    #[test]
    fn empty_sockopts_block_is_present() {
        let hop: HopConfig = serde_yaml::from_str("name: h\nsockopts: {}").unwrap();
        assert_eq!(hop.sockopts, Some(SockOptsConfig { mark: 0 }));
    }
}
