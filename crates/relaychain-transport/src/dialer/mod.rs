//! Dialers: how the byte stream to a node is established.

mod tcp;
mod tls;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use relaychain_config::Metadata;
use relaychain_core::DEFAULT_CONNECT_TIMEOUT_SECS;

use crate::error::TransportError;
use crate::sockopt::SockOpts;
use crate::tls::ClientTlsConfig;
use crate::{Auth, BoxStream};

pub use tcp::{TcpDialer, connect_tcp};
pub use tls::TlsDialer;

/// Establishes the stream to the first node of a route and performs any
/// per-node handshake once a stream reaches the node.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Apply metadata. Called once, right after construction.
    fn init(&mut self, md: &Metadata) -> Result<(), TransportError>;

    /// Open a new connection to `addr`.
    async fn dial(&self, addr: &str, opts: &DialOptions) -> Result<BoxStream, TransportError>;

    /// Wrap a stream that reaches the node at `addr`, e.g. with TLS.
    async fn handshake(&self, stream: BoxStream, _addr: &str) -> Result<BoxStream, TransportError> {
        Ok(stream)
    }
}

/// Per-dial socket settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialOptions {
    pub interface: Option<String>,
    pub sockopts: Option<SockOpts>,
    pub timeout: Duration,
}

impl Default for DialOptions {
    fn default() -> Self {
        Self {
            interface: None,
            sockopts: None,
            timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Construction options shared by every dialer.
#[derive(Debug, Clone)]
pub struct DialerOptions {
    pub auth: Option<Auth>,
    pub tls: Arc<ClientTlsConfig>,
    /// Span carrying chain/hop/node/dialer context.
    pub span: tracing::Span,
}

impl DialerOptions {
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
