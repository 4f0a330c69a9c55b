//! Plain TCP dialer.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use relaychain_config::Metadata;
use relaychain_core::{DEFAULT_TCP_KEEPALIVE_SECS, DEFAULT_TCP_NO_DELAY};
use socket2::{Domain, Protocol, SockRef, Socket, TcpKeepalive, Type};
use tokio::net::{TcpSocket, TcpStream, lookup_host};
use tracing::debug;

use super::{DialOptions, Dialer, DialerOptions};
use crate::error::TransportError;
use crate::sockopt::bind_interface;
use crate::BoxStream;

/// Dials plain TCP, honouring interface binding and the routing mark.
///
/// Metadata:
/// - `keepalive_secs`: TCP keep-alive idle time (0 disables)
/// - `nodelay`: TCP_NODELAY
/// - `connect_timeout_secs`: overrides the dial timeout
#[derive(Debug)]
pub struct TcpDialer {
    keepalive: Option<Duration>,
    nodelay: bool,
    timeout: Option<Duration>,
    span: tracing::Span,
}

impl TcpDialer {
    pub fn new(opts: DialerOptions) -> Self {
        Self {
            keepalive: keepalive(DEFAULT_TCP_KEEPALIVE_SECS),
            nodelay: DEFAULT_TCP_NO_DELAY,
            timeout: None,
            span: opts.span,
        }
    }

    pub(crate) async fn dial_tcp(
        &self,
        addr: &str,
        opts: &DialOptions,
    ) -> Result<TcpStream, TransportError> {
        let mut opts = opts.clone();
        if let Some(timeout) = self.timeout {
            opts.timeout = timeout;
        }
        debug!(parent: &self.span, addr, interface = ?opts.interface, "tcp dial");
        let stream = connect_tcp(addr, &opts).await?;

        stream.set_nodelay(self.nodelay)?;
        if let Some(idle) = self.keepalive {
            SockRef::from(&stream).set_tcp_keepalive(&TcpKeepalive::new().with_time(idle))?;
        }
        Ok(stream)
    }
}

fn keepalive(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[async_trait]
impl Dialer for TcpDialer {
    fn init(&mut self, md: &Metadata) -> Result<(), TransportError> {
        if let Some(secs) = md.get_u64("keepalive_secs")? {
            self.keepalive = keepalive(secs);
        }
        if let Some(nodelay) = md.get_bool("nodelay")? {
            self.nodelay = nodelay;
        }
        if let Some(secs) = md.get_u64("connect_timeout_secs")? {
            self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(())
    }

    async fn dial(&self, addr: &str, opts: &DialOptions) -> Result<BoxStream, TransportError> {
        Ok(Box::new(self.dial_tcp(addr, opts).await?))
    }
}

/// Connect to `addr` (resolved with the system resolver if it is not an IP
/// literal), trying each address in turn.
pub async fn connect_tcp(addr: &str, opts: &DialOptions) -> Result<TcpStream, TransportError> {
    let targets: Vec<SocketAddr> = lookup_host(addr).await?.collect();
    let mut last_err = None;

    for target in targets {
        match tokio::time::timeout(opts.timeout, connect_one(target, opts)).await {
            Ok(Ok(stream)) => return Ok(stream),
            Ok(Err(e)) => last_err = Some(TransportError::Io(e)),
            Err(_) => last_err = Some(TransportError::Timeout("tcp connect")),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        TransportError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no addresses for {addr}"),
        ))
    }))
}

async fn connect_one(target: SocketAddr, opts: &DialOptions) -> io::Result<TcpStream> {
    let socket = Socket::new(Domain::for_address(target), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_nonblocking(true)?;
    if let Some(interface) = opts.interface.as_deref() {
        bind_interface(&socket, interface)?;
    }
    if let Some(sockopts) = opts.sockopts {
        sockopts.apply(&socket)?;
    }
    TcpSocket::from_std_stream(socket.into()).connect(target).await
}
