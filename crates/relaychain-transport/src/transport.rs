use std::fmt;

use crate::connector::Connector;
use crate::dialer::{DialOptions, Dialer};
use crate::error::TransportError;
use crate::sockopt::SockOpts;
use crate::{BoxStream, Network};

/// A node's bound connector and dialer plus its addressing and socket
/// settings.
pub struct Transport {
    connector: Box<dyn Connector>,
    dialer: Box<dyn Dialer>,
    addr: String,
    interface: Option<String>,
    sockopts: Option<SockOpts>,
}

impl Transport {
    pub fn builder() -> TransportBuilder {
        TransportBuilder::default()
    }

    /// Node address (`host:port`) as configured.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    pub fn sockopts(&self) -> Option<SockOpts> {
        self.sockopts
    }

    pub fn dial_options(&self) -> DialOptions {
        DialOptions {
            interface: self.interface.clone(),
            sockopts: self.sockopts,
            ..DialOptions::default()
        }
    }

    /// Open a connection to the node at `addr` (normally the configured
    /// address after host mapping and resolution).
    pub async fn dial(&self, addr: &str) -> Result<BoxStream, TransportError> {
        self.dialer.dial(addr, &self.dial_options()).await
    }

    /// Run the dialer's handshake over a stream that reaches this node.
    pub async fn handshake(&self, stream: BoxStream) -> Result<BoxStream, TransportError> {
        self.dialer.handshake(stream, &self.addr).await
    }

    /// Ask this node to connect onward to `addr`.
    pub async fn connect(
        &self,
        stream: BoxStream,
        network: Network,
        addr: &str,
    ) -> Result<BoxStream, TransportError> {
        self.connector.connect(stream, network, addr).await
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("addr", &self.addr)
            .field("interface", &self.interface)
            .field("sockopts", &self.sockopts)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for [`Transport`].
#[derive(Default)]
pub struct TransportBuilder {
    connector: Option<Box<dyn Connector>>,
    dialer: Option<Box<dyn Dialer>>,
    addr: String,
    interface: Option<String>,
    sockopts: Option<SockOpts>,
}

impl TransportBuilder {
    pub fn connector(mut self, connector: Box<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn dialer(mut self, dialer: Box<dyn Dialer>) -> Self {
        self.dialer = Some(dialer);
        self
    }

    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    pub fn interface(mut self, interface: Option<String>) -> Self {
        self.interface = interface;
        self
    }

    pub fn sockopts(mut self, sockopts: Option<SockOpts>) -> Self {
        self.sockopts = sockopts;
        self
    }

    pub fn build(self) -> Result<Transport, TransportError> {
        Ok(Transport {
            connector: self.connector.ok_or(TransportError::MissingConnector)?,
            dialer: self.dialer.ok_or(TransportError::MissingDialer)?,
            addr: self.addr,
            interface: self.interface,
            sockopts: self.sockopts,
        })
    }
}
