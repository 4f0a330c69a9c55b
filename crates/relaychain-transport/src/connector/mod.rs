//! Connectors: the protocol a node speaks over an established stream.

mod forward;
mod http;
mod socks5;

use std::sync::Arc;

use async_trait::async_trait;
use relaychain_config::Metadata;

use crate::error::TransportError;
use crate::tls::ClientTlsConfig;
use crate::{Auth, BoxStream, Network};

pub use forward::ForwardConnector;
pub use http::HttpConnector;
pub use socks5::Socks5Connector;

/// Speaks a proxy protocol over a stream that already reaches the proxy,
/// asking it to connect onward to `addr`.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Apply metadata. Called once, right after construction.
    fn init(&mut self, md: &Metadata) -> Result<(), TransportError>;

    /// Ask the proxy at the other end of `stream` to connect to `addr`.
    async fn connect(
        &self,
        stream: BoxStream,
        network: Network,
        addr: &str,
    ) -> Result<BoxStream, TransportError>;
}

/// Construction options shared by every connector.
#[derive(Debug, Clone)]
pub struct ConnectorOptions {
    pub auth: Option<Auth>,
    pub tls: Arc<ClientTlsConfig>,
    /// Span carrying chain/hop/node/connector context.
    pub span: tracing::Span,
}

impl ConnectorOptions {
    pub fn new(tls: Arc<ClientTlsConfig>) -> Self {
        Self {
            auth: None,
            tls,
            span: tracing::Span::none(),
        }
    }

    pub fn with_auth(mut self, auth: Option<Auth>) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }
}
