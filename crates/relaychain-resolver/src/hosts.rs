//! Static host tables.

use std::collections::HashMap;
use std::net::IpAddr;

use relaychain_config::HostsConfig;

use crate::HostMapper;

/// Hostname → addresses table built from a [`HostsConfig`].
///
/// Lookups are case-insensitive and ignore a trailing dot. A hostname listed
/// in several mappings resolves to all of their addresses, in order.
#[derive(Debug, Default)]
pub struct StaticHosts {
    name: String,
    table: HashMap<String, Vec<IpAddr>>,
}

impl StaticHosts {
    pub fn from_config(cfg: &HostsConfig) -> Self {
        let mut hosts = Self {
            name: cfg.name.clone(),
            table: HashMap::new(),
        };
        for mapping in &cfg.mappings {
            for host in std::iter::once(&mapping.hostname).chain(&mapping.aliases) {
                hosts.insert(host, mapping.ip);
            }
        }
        hosts
    }

    pub fn insert(&mut self, host: &str, ip: IpAddr) {
        let ips = self.table.entry(normalize(host)).or_default();
        if !ips.contains(&ip) {
            ips.push(ip);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

fn normalize(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

impl HostMapper for StaticHosts {
    fn lookup(&self, host: &str) -> Option<Vec<IpAddr>> {
        self.table.get(&normalize(host)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use relaychain_config::HostMappingConfig;

    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn hostnames_and_aliases() {
        let hosts = StaticHosts::from_config(&HostsConfig {
            name: "static".into(),
            mappings: vec![
                HostMappingConfig {
                    ip: ip("10.1.0.1"),
                    hostname: "relay.internal".into(),
                    aliases: vec!["r1".into()],
                },
                HostMappingConfig {
                    ip: ip("fd00::1"),
                    hostname: "Relay.Internal".into(),
                    aliases: vec![],
                },
            ],
        });

        assert_eq!(hosts.name(), "static");
        assert_eq!(hosts.len(), 2);
        assert_eq!(
            hosts.lookup("relay.internal."),
            Some(vec![ip("10.1.0.1"), ip("fd00::1")])
        );
        assert_eq!(hosts.lookup("R1"), Some(vec![ip("10.1.0.1")]));
        assert_eq!(hosts.lookup("other"), None);
    }
}
