//! Component registry for relaychain.
//!
//! Chains refer to components by name: connectors and dialers by type
//! (`http`, `tls`, ...), resolvers, host tables and bypasses by the names
//! declared in configuration. A [`Registry`] maps those names to
//! constructors (connectors, dialers) or shared instances (everything else).
//!
//! The registry is populated once through [`RegistryBuilder`] and is
//! immutable afterwards; share it with `Arc<Registry>`.
//!
//! ```rust,no_run
//! # fn example(config: &relaychain_config::Config) -> Result<(), relaychain_registry::RegistryError> {
//! use relaychain_registry::Registry;
//!
//! let registry = Registry::builder()
//!     .with_builtins()
//!     .load_config(config)?
//!     .build();
//! assert!(registry.connector("http").is_some());
//! # Ok(())
//! # }
//! ```

mod error;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use relaychain_bypass::{Bypass, MatcherBypass};
use relaychain_config::Config;
use relaychain_resolver::{DnsResolver, HostMapper, NameResolver, StaticHosts};
use relaychain_transport::connector::{ForwardConnector, HttpConnector, Socks5Connector};
use relaychain_transport::dialer::{TcpDialer, TlsDialer};
use relaychain_transport::{Connector, ConnectorOptions, Dialer, DialerOptions};
use tracing::debug;

pub use error::RegistryError;

/// Creates a connector instance for one node.
pub type ConnectorFactory = Arc<dyn Fn(ConnectorOptions) -> Box<dyn Connector> + Send + Sync>;

/// Creates a dialer instance for one node.
pub type DialerFactory = Arc<dyn Fn(DialerOptions) -> Box<dyn Dialer> + Send + Sync>;

/// Immutable name → component table.
#[derive(Default)]
pub struct Registry {
    connectors: HashMap<String, ConnectorFactory>,
    dialers: HashMap<String, DialerFactory>,
    resolvers: HashMap<String, Arc<dyn NameResolver>>,
    hosts: HashMap<String, Arc<dyn HostMapper>>,
    bypasses: HashMap<String, Arc<dyn Bypass>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn connector(&self, kind: &str) -> Option<&ConnectorFactory> {
        self.connectors.get(kind)
    }

    pub fn dialer(&self, kind: &str) -> Option<&DialerFactory> {
        self.dialers.get(kind)
    }

    pub fn resolver(&self, name: &str) -> Option<Arc<dyn NameResolver>> {
        self.resolvers.get(name).cloned()
    }

    pub fn hosts(&self, name: &str) -> Option<Arc<dyn HostMapper>> {
        self.hosts.get(name).cloned()
    }

    pub fn bypass(&self, name: &str) -> Option<Arc<dyn Bypass>> {
        self.bypasses.get(name).cloned()
    }

    /// Registered connector types, sorted.
    pub fn connector_kinds(&self) -> Vec<&str> {
        sorted_keys(&self.connectors)
    }

    /// Registered dialer types, sorted.
    pub fn dialer_kinds(&self) -> Vec<&str> {
        sorted_keys(&self.dialers)
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("connectors", &self.connector_kinds())
            .field("dialers", &self.dialer_kinds())
            .field("resolvers", &sorted_keys(&self.resolvers))
            .field("hosts", &sorted_keys(&self.hosts))
            .field("bypasses", &sorted_keys(&self.bypasses))
            .finish()
    }
}

/// Populates a [`Registry`].
///
/// Registering a name twice within one role is an error.
#[derive(Default)]
pub struct RegistryBuilder {
    inner: Registry,
}

impl RegistryBuilder {
    /// Register the built-in connectors (`forward`, `http`, `socks5`) and
    /// dialers (`tcp`, `tls`).
    pub fn with_builtins(mut self) -> Self {
        let r = &mut self.inner;
        r.connectors.insert("forward".into(), connector_factory(ForwardConnector::new));
        r.connectors.insert("http".into(), connector_factory(HttpConnector::new));
        r.connectors.insert("socks5".into(), connector_factory(Socks5Connector::new));
        r.dialers.insert("tcp".into(), dialer_factory(TcpDialer::new));
        r.dialers.insert("tls".into(), dialer_factory(TlsDialer::new));
        self
    }

    pub fn register_connector<F>(mut self, kind: &str, factory: F) -> Result<Self, RegistryError>
    where
        F: Fn(ConnectorOptions) -> Box<dyn Connector> + Send + Sync + 'static,
    {
        let factory: ConnectorFactory = Arc::new(factory);
        insert_unique(&mut self.inner.connectors, "connector", kind, factory)?;
        Ok(self)
    }

    pub fn register_dialer<F>(mut self, kind: &str, factory: F) -> Result<Self, RegistryError>
    where
        F: Fn(DialerOptions) -> Box<dyn Dialer> + Send + Sync + 'static,
    {
        let factory: DialerFactory = Arc::new(factory);
        insert_unique(&mut self.inner.dialers, "dialer", kind, factory)?;
        Ok(self)
    }

    pub fn register_resolver(
        mut self,
        name: &str,
        resolver: Arc<dyn NameResolver>,
    ) -> Result<Self, RegistryError> {
        insert_unique(&mut self.inner.resolvers, "resolver", name, resolver)?;
        Ok(self)
    }

    pub fn register_hosts(
        mut self,
        name: &str,
        hosts: Arc<dyn HostMapper>,
    ) -> Result<Self, RegistryError> {
        insert_unique(&mut self.inner.hosts, "hosts", name, hosts)?;
        Ok(self)
    }

    pub fn register_bypass(
        mut self,
        name: &str,
        bypass: Arc<dyn Bypass>,
    ) -> Result<Self, RegistryError> {
        insert_unique(&mut self.inner.bypasses, "bypass", name, bypass)?;
        Ok(self)
    }

    /// Build and register every bypass, resolver and host table declared in
    /// `config`.
    pub fn load_config(mut self, config: &Config) -> Result<Self, RegistryError> {
        for cfg in &config.bypasses {
            let bypass = MatcherBypass::from_config(cfg)?;
            self = self.register_bypass(&cfg.name, Arc::new(bypass))?;
        }
        for cfg in &config.resolvers {
            let resolver =
                DnsResolver::new(&cfg.dns).map_err(|source| RegistryError::Resolver {
                    name: cfg.name.clone(),
                    source,
                })?;
            self = self.register_resolver(&cfg.name, Arc::new(resolver))?;
        }
        for cfg in &config.hosts {
            self = self.register_hosts(&cfg.name, Arc::new(StaticHosts::from_config(cfg)))?;
        }
        debug!(
            bypasses = config.bypasses.len(),
            resolvers = config.resolvers.len(),
            hosts = config.hosts.len(),
            "registry loaded from config"
        );
        Ok(self)
    }

    pub fn build(self) -> Registry {
        self.inner
    }
}

fn connector_factory<C, F>(make: F) -> ConnectorFactory
where
    C: Connector + 'static,
    F: Fn(ConnectorOptions) -> C + Send + Sync + 'static,
{
    Arc::new(move |opts: ConnectorOptions| -> Box<dyn Connector> { Box::new(make(opts)) })
}

fn dialer_factory<D, F>(make: F) -> DialerFactory
where
    D: Dialer + 'static,
    F: Fn(DialerOptions) -> D + Send + Sync + 'static,
{
    Arc::new(move |opts: DialerOptions| -> Box<dyn Dialer> { Box::new(make(opts)) })
}

fn insert_unique<V>(
    map: &mut HashMap<String, V>,
    kind: &'static str,
    name: &str,
    value: V,
) -> Result<(), RegistryError> {
    match map.entry(name.to_string()) {
        Entry::Occupied(_) => Err(RegistryError::Duplicate {
            kind,
            name: name.to_string(),
        }),
        Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::IpAddr;

    use async_trait::async_trait;
    use relaychain_resolver::DnsError;

    use super::*;

    #[derive(Debug)]
    struct NoResolver;

    #[async_trait]
    impl NameResolver for NoResolver {
        async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, DnsError> {
            Err(DnsError::NoResults(host.to_string()))
        }
    }

    #[test]
    fn builtins() {
        let registry = Registry::builder().with_builtins().build();
        assert_eq!(registry.connector_kinds(), vec!["forward", "http", "socks5"]);
        assert_eq!(registry.dialer_kinds(), vec!["tcp", "tls"]);
        assert!(registry.connector("quic").is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let err = Registry::builder()
            .with_builtins()
            .register_dialer("tcp", |o| Box::new(TcpDialer::new(o)))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RegistryError::Duplicate { kind: "dialer", ref name } if name == "tcp"
        ));

        let err = Registry::builder()
            .register_resolver("dns", Arc::new(NoResolver))
            .unwrap()
            .register_resolver("dns", Arc::new(NoResolver))
            .err()
            .unwrap();
        assert!(matches!(err, RegistryError::Duplicate { kind: "resolver", .. }));
    }

    #[test]
    fn same_name_in_different_roles() {
        let registry = Registry::builder()
            .register_connector("custom", |o| Box::new(ForwardConnector::new(o)))
            .unwrap()
            .register_dialer("custom", |o| Box::new(TcpDialer::new(o)))
            .unwrap()
            .build();
        assert!(registry.connector("custom").is_some());
        assert!(registry.dialer("custom").is_some());
    }

    #[test]
    fn load_config_registers_named_components() {
        let config: Config = serde_yaml::from_str(
            r#"
bypasses:
  - name: lan
    matchers: ["10.0.0.0/8"]
hosts:
  - name: static
    mappings: [{ hostname: relay.internal, ip: 10.1.0.1 }]
resolvers:
  - name: google
    strategy: custom
    servers: ["udp://8.8.8.8"]
"#,
        )
        .unwrap();

        let registry = Registry::builder().load_config(&config).unwrap().build();
        assert!(registry.bypass("lan").unwrap().contains("10.9.9.9:80"));
        assert_eq!(
            registry.hosts("static").unwrap().lookup("relay.internal"),
            Some(vec!["10.1.0.1".parse::<IpAddr>().unwrap()])
        );
        assert!(registry.resolver("google").is_some());
        assert!(registry.bypass("wan").is_none());
    }

    #[test]
    fn load_config_reports_bad_components() {
        let config: Config =
            serde_yaml::from_str("bypasses: [{ name: bad, matchers: ['300.0.0.0/8'] }]").unwrap();
        assert!(matches!(
            Registry::builder().load_config(&config).err().unwrap(),
            RegistryError::Bypass(_)
        ));

        let config: Config = serde_yaml::from_str(
            "resolvers: [{ name: r, strategy: custom, servers: ['ftp://x'] }]",
        )
        .unwrap();
        assert!(matches!(
            Registry::builder().load_config(&config).err().unwrap(),
            RegistryError::Resolver { ref name, .. } if name == "r"
        ));
    }
}
