use std::fmt;
use std::sync::Arc;

use relaychain_bypass::BypassGroup;
use relaychain_config::Metadata;
use relaychain_core::ERROR_DIAL;
use relaychain_resolver::{HostMapper, NameResolver};
use relaychain_selector::{Marker, Selectable};
use relaychain_transport::{BoxStream, Transport, TransportError};
use tracing::{Span, error};

use crate::error::ChainError;

/// Metadata key flagging a node as backup.
pub const METADATA_BACKUP: &str = "backup";

/// One concrete proxy endpoint inside a hop.
pub struct Node {
    name: String,
    addr: String,
    transport: Transport,
    bypass: BypassGroup,
    resolver: Option<Arc<dyn NameResolver>>,
    hosts: Option<Arc<dyn HostMapper>>,
    metadata: Metadata,
    backup: bool,
    marker: Marker,
    span: Span,
}

impl Node {
    pub fn builder(
        name: impl Into<String>,
        addr: impl Into<String>,
        transport: Transport,
    ) -> NodeBuilder {
        NodeBuilder {
            name: name.into(),
            addr: addr.into(),
            transport,
            bypass: BypassGroup::default(),
            resolver: None,
            hosts: None,
            metadata: Metadata::default(),
            span: Span::none(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Targets this node must not be used for.
    pub fn bypass(&self) -> &BypassGroup {
        &self.bypass
    }

    pub fn resolver(&self) -> Option<&dyn NameResolver> {
        self.resolver.as_deref()
    }

    pub fn hosts(&self) -> Option<&dyn HostMapper> {
        self.hosts.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Update the failure marker from a dial outcome.
    pub(crate) fn record(
        &self,
        result: Result<BoxStream, TransportError>,
    ) -> Result<BoxStream, ChainError> {
        match result {
            Ok(stream) => {
                self.marker.reset();
                Ok(stream)
            }
            Err(source) => {
                self.marker.mark();
                error!(
                    parent: &self.span,
                    kind = ERROR_DIAL,
                    fails = self.marker.fail_count(),
                    error = %source,
                    "node unreachable"
                );
                Err(ChainError::Dial {
                    node: self.name.clone(),
                    source,
                })
            }
        }
    }
}

impl Selectable for Node {
    fn marker(&self) -> &Marker {
        &self.marker
    }

    fn is_backup(&self) -> bool {
        self.backup
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("addr", &self.addr)
            .field("transport", &self.transport)
            .field("bypass", &self.bypass)
            .field("resolver", &self.resolver)
            .field("hosts", &self.hosts)
            .field("backup", &self.backup)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for [`Node`].
pub struct NodeBuilder {
    name: String,
    addr: String,
    transport: Transport,
    bypass: BypassGroup,
    resolver: Option<Arc<dyn NameResolver>>,
    hosts: Option<Arc<dyn HostMapper>>,
    metadata: Metadata,
    span: Span,
}

impl NodeBuilder {
    pub fn bypass(mut self, bypass: BypassGroup) -> Self {
        self.bypass = bypass;
        self
    }

    pub fn resolver(mut self, resolver: Option<Arc<dyn NameResolver>>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn hosts(mut self, hosts: Option<Arc<dyn HostMapper>>) -> Self {
        self.hosts = hosts;
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Span dial failures are logged under.
    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Fails when the `backup` metadata entry is not a boolean.
    pub fn build(self) -> Result<Node, ChainError> {
        let backup = self
            .metadata
            .get_bool(METADATA_BACKUP)
            .map_err(|e| ChainError::Metadata {
                node: self.name.clone(),
                source: e,
            })?
            .unwrap_or(false);

        Ok(Node {
            name: self.name,
            addr: self.addr,
            transport: self.transport,
            bypass: self.bypass,
            resolver: self.resolver,
            hosts: self.hosts,
            metadata: self.metadata,
            backup,
            marker: Marker::new(),
            span: self.span,
        })
    }
}
