//! Chain construction from configuration.

use std::sync::Arc;

use relaychain_config::{
    ChainConfig, ConnectorConfig, DialerConfig, HopConfig, Metadata, NodeConfig, TlsConfig,
};
use relaychain_core::{ERROR_CONFIG, ERROR_INIT, ERROR_REGISTRY, ERROR_TLS};
use relaychain_registry::Registry;
use relaychain_selector::Selector;
use relaychain_transport::{
    Auth, ClientTlsConfig, Connector, ConnectorOptions, Dialer, DialerOptions, SockOpts,
    TlsOptions, Transport, load_client_config,
};
use tracing::{Span, debug, error, info_span};

use crate::bypass::compose_bypass;
use crate::chain::Chain;
use crate::error::ChainError;
use crate::group::NodeGroup;
use crate::inherit::inherit;
use crate::node::Node;
use crate::select::{parse_selector, resolve_selector};

/// Builds [`Chain`]s against a registry.
///
/// Building is synchronous and stops at the first failure. Each failure is
/// logged once, under the span of the stage it happened in.
#[derive(Debug, Clone, Copy)]
pub struct ChainBuilder<'a> {
    registry: &'a Registry,
}

impl<'a> ChainBuilder<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Build a chain. An absent config yields `Ok(None)`.
    pub fn build(&self, cfg: Option<&ChainConfig>) -> Result<Option<Chain>, ChainError> {
        let Some(cfg) = cfg else {
            return Ok(None);
        };

        let span = info_span!("chain", kind = "chain", chain = %cfg.name);
        let chain_selector = parse_selector(cfg.selector.as_ref());

        let mut groups = Vec::with_capacity(cfg.hops.len());
        for hop in &cfg.hops {
            groups.push(self.build_group(&span, chain_selector.as_ref(), hop)?);
        }

        debug!(parent: &span, hops = groups.len(), "chain built");
        Ok(Some(Chain::new(
            cfg.name.clone(),
            cfg.metadata.clone().unwrap_or_default(),
            groups,
        )))
    }

    fn build_group(
        &self,
        chain_span: &Span,
        chain_selector: Option<&Arc<Selector>>,
        hop: &HopConfig,
    ) -> Result<NodeGroup, ChainError> {
        let mut nodes = Vec::with_capacity(hop.nodes.len());
        for node in &hop.nodes {
            nodes.push(Arc::new(self.build_node(chain_span, hop, node)?));
        }

        let selector = resolve_selector(hop.selector.as_ref(), chain_selector);
        let bypass = compose_bypass(self.registry, hop.bypass.as_deref(), &hop.bypasses);
        debug!(
            parent: chain_span,
            hop = %hop.name,
            nodes = nodes.len(),
            selector = %selector.kind(),
            bypasses = bypass.len(),
            "hop built"
        );
        Ok(NodeGroup::new(hop.name.clone(), nodes, selector, bypass))
    }

    fn build_node(
        &self,
        chain_span: &Span,
        hop: &HopConfig,
        cfg: &NodeConfig,
    ) -> Result<Node, ChainError> {
        let span = info_span!(
            parent: chain_span,
            "node",
            kind = "node",
            hop = %hop.name,
            node = %cfg.name,
            connector = %cfg.connector.kind,
            dialer = %cfg.dialer.kind
        );

        let connector = self.build_connector(chain_span, &span, &cfg.connector)?;
        let dialer = self.build_dialer(chain_span, &span, &cfg.dialer)?;

        let settings = inherit(cfg, hop);
        let transport = Transport::builder()
            .connector(connector)
            .dialer(dialer)
            .addr(&cfg.addr)
            .interface(settings.interface)
            .sockopts(settings.sockopts.map(SockOpts::from))
            .build()
            .map_err(|e| {
                error!(parent: &span, kind = ERROR_CONFIG, error = %e, "build transport");
                ChainError::Transport(e)
            })?;

        let resolver = settings.resolver.as_deref().and_then(|name| {
            let found = self.registry.resolver(name);
            if found.is_none() {
                debug!(parent: &span, resolver = name, "resolver not registered");
            }
            found
        });
        let hosts = settings.hosts.as_deref().and_then(|name| {
            let found = self.registry.hosts(name);
            if found.is_none() {
                debug!(parent: &span, hosts = name, "hosts not registered");
            }
            found
        });

        Node::builder(&cfg.name, &cfg.addr, transport)
            .bypass(compose_bypass(self.registry, cfg.bypass.as_deref(), &cfg.bypasses))
            .resolver(resolver)
            .hosts(hosts)
            .metadata(cfg.metadata.clone().unwrap_or_default())
            .span(span.clone())
            .build()
            .map_err(|e| {
                error!(parent: &span, kind = ERROR_CONFIG, error = %e, "build node");
                e
            })
    }

    fn build_connector(
        &self,
        chain_span: &Span,
        node_span: &Span,
        cfg: &ConnectorConfig,
    ) -> Result<Box<dyn Connector>, ChainError> {
        let tls = load_tls(chain_span, "connector", cfg.tls.as_ref())?;

        let Some(factory) = self.registry.connector(&cfg.kind) else {
            error!(parent: node_span, kind = ERROR_REGISTRY, "unknown connector type");
            return Err(ChainError::UnknownConnector(cfg.kind.clone()));
        };

        let span = info_span!(parent: node_span, "connector", kind = "connector");
        let opts = ConnectorOptions::new(tls)
            .with_auth(cfg.auth.as_ref().map(Auth::from))
            .with_span(span.clone());
        let mut connector = factory(opts);

        let empty = Metadata::default();
        connector
            .init(cfg.metadata.as_ref().unwrap_or(&empty))
            .map_err(|source| {
                error!(parent: &span, kind = ERROR_INIT, error = %source, "init connector");
                ChainError::ConnectorInit {
                    connector: cfg.kind.clone(),
                    source,
                }
            })?;
        Ok(connector)
    }

    fn build_dialer(
        &self,
        chain_span: &Span,
        node_span: &Span,
        cfg: &DialerConfig,
    ) -> Result<Box<dyn Dialer>, ChainError> {
        let tls = load_tls(chain_span, "dialer", cfg.tls.as_ref())?;

        let Some(factory) = self.registry.dialer(&cfg.kind) else {
            error!(parent: node_span, kind = ERROR_REGISTRY, "unknown dialer type");
            return Err(ChainError::UnknownDialer(cfg.kind.clone()));
        };

        let span = info_span!(parent: node_span, "dialer", kind = "dialer");
        let opts = DialerOptions::new(tls)
            .with_auth(cfg.auth.as_ref().map(Auth::from))
            .with_span(span.clone());
        let mut dialer = factory(opts);

        let empty = Metadata::default();
        dialer
            .init(cfg.metadata.as_ref().unwrap_or(&empty))
            .map_err(|source| {
                error!(parent: &span, kind = ERROR_INIT, error = %source, "init dialer");
                ChainError::DialerInit {
                    dialer: cfg.kind.clone(),
                    source,
                }
            })?;
        Ok(dialer)
    }
}

fn load_tls(
    chain_span: &Span,
    role: &'static str,
    cfg: Option<&TlsConfig>,
) -> Result<Arc<ClientTlsConfig>, ChainError> {
    load_client_config(&TlsOptions::from_config(cfg))
        .map(Arc::new)
        .map_err(|e| {
            error!(parent: chain_span, kind = ERROR_TLS, role, error = %e, "load TLS config");
            ChainError::Tls(e)
        })
}
