//! TLS-over-TCP dialer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use relaychain_config::Metadata;
use relaychain_core::DEFAULT_TLS_HANDSHAKE_TIMEOUT_SECS;
use rustls::pki_types::ServerName;
use tracing::debug;

use super::{DialOptions, Dialer, DialerOptions, TcpDialer};
use crate::error::TransportError;
use crate::tls::ClientTlsConfig;
use crate::BoxStream;

/// Dials TCP and wraps the stream reaching the node in TLS.
///
/// Accepts the TCP dialer's metadata plus `server_name`, which overrides the
/// server name of the TLS block.
#[derive(Debug)]
pub struct TlsDialer {
    tcp: TcpDialer,
    tls: Arc<ClientTlsConfig>,
    server_name: Option<String>,
    handshake_timeout: Duration,
    span: tracing::Span,
}

impl TlsDialer {
    pub fn new(opts: DialerOptions) -> Self {
        Self {
            tls: Arc::clone(&opts.tls),
            server_name: None,
            handshake_timeout: Duration::from_secs(DEFAULT_TLS_HANDSHAKE_TIMEOUT_SECS),
            span: opts.span.clone(),
            tcp: TcpDialer::new(opts),
        }
    }

    fn server_name(&self, addr: &str) -> Result<ServerName<'static>, TransportError> {
        match &self.server_name {
            Some(name) => ServerName::try_from(name.clone()).map_err(|e| {
                TransportError::Config(format!("invalid TLS server name '{name}': {e}"))
            }),
            None => self.tls.resolve_server_name(addr),
        }
    }
}

#[async_trait]
impl Dialer for TlsDialer {
    fn init(&mut self, md: &Metadata) -> Result<(), TransportError> {
        self.tcp.init(md)?;
        if let Some(name) = md.get_string("server_name")? {
            self.server_name = Some(name).filter(|n| !n.is_empty());
        }
        if let Some(secs) = md.get_u64("handshake_timeout_secs")?
            && secs > 0
        {
            self.handshake_timeout = Duration::from_secs(secs);
        }
        Ok(())
    }

    async fn dial(&self, addr: &str, opts: &DialOptions) -> Result<BoxStream, TransportError> {
        Ok(Box::new(self.tcp.dial_tcp(addr, opts).await?))
    }

    async fn handshake(&self, stream: BoxStream, addr: &str) -> Result<BoxStream, TransportError> {
        let server_name = self.server_name(addr)?;
        debug!(parent: &self.span, addr, server_name = ?server_name, "tls handshake");

        let tls = tokio::time::timeout(
            self.handshake_timeout,
            self.tls.connector().connect(server_name, stream),
        )
        .await
        .map_err(|_| TransportError::Timeout("TLS handshake"))??;
        Ok(Box::new(tls))
    }
}
