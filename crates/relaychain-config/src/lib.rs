//! Configuration loading, validation and CLI overrides for relaychain.
//!
//! A config file declares named chains (hops → nodes) together with the
//! bypass rule sets, DNS resolvers and host tables that chains reference
//! by name.

mod cli;
mod defaults;
mod loader;
mod metadata;
mod types;
mod validate;

use serde::{Deserialize, Serialize};

pub use cli::{CliOverrides, apply_overrides};
pub use loader::{ConfigError, load_config, parse_config};
pub use metadata::{Metadata, MetadataError};
pub use types::*;
pub use validate::{unresolved_references, validate_config};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chains: Vec<ChainConfig>,
    #[serde(default)]
    pub bypasses: Vec<BypassConfig>,
    #[serde(default)]
    pub resolvers: Vec<ResolverConfig>,
    #[serde(default)]
    pub hosts: Vec<HostsConfig>,
    #[serde(default, alias = "log")]
    pub logging: LoggingConfig,
}

impl Config {
    /// Look up a chain by name.
    pub fn chain(&self, name: &str) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
log:
  level: debug
bypasses:
  - name: lan
    matchers: ["10.0.0.0/8", "*.local"]
resolvers:
  - name: google
    strategy: custom
    servers: ["udp://8.8.8.8"]
hosts:
  - name: static
    mappings:
      - { ip: 10.1.0.1, hostname: relay.internal }
chains:
  - name: chain-0
    selector: { strategy: round }
    metadata: { retries: 2 }
    hops:
      - name: hop-0
        bypass: lan
        resolver: google
        interface: eth0
        sockopts: { mark: 100 }
        nodes:
          - name: node-0
            addr: 1.2.3.4:8080
            connector:
              type: http
              auth: { username: u, password: p }
            dialer:
              type: tls
              tls: { secure: true, server_name: proxy.example.com }
          - name: node-1
            addr: 1.2.3.5:1080
            connector: { type: socks5 }
            hosts: static
"#;

    #[test]
    fn parse_full_yaml() {
        let config = parse_config(YAML, "yaml").unwrap();
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.bypasses[0].matchers.len(), 2);
        assert_eq!(config.hosts[0].mappings[0].hostname, "relay.internal");

        let chain = config.chain("chain-0").unwrap();
        assert_eq!(chain.selector.as_ref().unwrap().strategy, "round");
        assert_eq!(
            chain.metadata.as_ref().unwrap().get_u64("retries").unwrap(),
            Some(2)
        );

        let hop = &chain.hops[0];
        assert_eq!(hop.bypass.as_deref(), Some("lan"));
        assert_eq!(hop.sockopts, Some(SockOptsConfig { mark: 100 }));
        assert_eq!(hop.nodes.len(), 2);

        let n0 = &hop.nodes[0];
        assert_eq!(n0.connector.auth.as_ref().unwrap().username, "u");
        let tls = n0.dialer.tls.as_ref().unwrap();
        assert!(tls.secure);
        assert_eq!(tls.server_name, "proxy.example.com");
        assert!(tls.cert_file.is_empty());

        let n1 = &hop.nodes[1];
        assert_eq!(n1.connector.kind, "socks5");
        assert_eq!(n1.dialer.kind, "tcp");
        assert_eq!(n1.hosts.as_deref(), Some("static"));

        validate_config(&config).unwrap();
    }

    #[test]
    fn chain_lookup_misses() {
        let config = parse_config(YAML, "yaml").unwrap();
        assert!(config.chain("nope").is_none());
    }
}
