//! SOCKS5 connector (RFC 1928, username/password auth per RFC 1929).

use std::net::IpAddr;

use async_trait::async_trait;
use relaychain_config::Metadata;
use relaychain_core::split_host_port;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use super::{Connector, ConnectorOptions};
use crate::error::TransportError;
use crate::{Auth, BoxStream, Network};

const SOCKS5_VERSION: u8 = 0x05;
const METHOD_NO_AUTH: u8 = 0x00;
const METHOD_USER_PASS: u8 = 0x02;
const METHOD_NO_ACCEPTABLE: u8 = 0xFF;

const AUTH_VERSION: u8 = 0x01;
const AUTH_SUCCESS: u8 = 0x00;

const CMD_CONNECT: u8 = 0x01;

const ATYP_IPV4: u8 = 0x01;
const ATYP_DOMAIN: u8 = 0x03;
const ATYP_IPV6: u8 = 0x04;

const REPLY_SUCCEEDED: u8 = 0x00;

/// Connects onward through a SOCKS5 proxy.
#[derive(Debug)]
pub struct Socks5Connector {
    auth: Option<Auth>,
    span: tracing::Span,
}

impl Socks5Connector {
    pub fn new(opts: ConnectorOptions) -> Self {
        Self {
            auth: opts.auth,
            span: opts.span,
        }
    }

    async fn negotiate(&self, stream: &mut BoxStream) -> Result<(), TransportError> {
        let greeting: &[u8] = if self.auth.is_some() {
            &[SOCKS5_VERSION, 2, METHOD_NO_AUTH, METHOD_USER_PASS]
        } else {
            &[SOCKS5_VERSION, 1, METHOD_NO_AUTH]
        };
        stream.write_all(greeting).await?;

        let mut reply = [0u8; 2];
        stream.read_exact(&mut reply).await?;
        if reply[0] != SOCKS5_VERSION {
            return Err(TransportError::Protocol(format!(
                "socks5: unexpected version {:#04x}",
                reply[0]
            )));
        }

        match (reply[1], &self.auth) {
            (METHOD_NO_AUTH, _) => Ok(()),
            (METHOD_USER_PASS, Some(auth)) => authenticate(stream, auth).await,
            (METHOD_NO_ACCEPTABLE, _) => Err(TransportError::Protocol(
                "socks5: no acceptable authentication method".into(),
            )),
            (method, _) => Err(TransportError::Protocol(format!(
                "socks5: unexpected method {method:#04x}"
            ))),
        }
    }
}

async fn authenticate(stream: &mut BoxStream, auth: &Auth) -> Result<(), TransportError> {
    let user = auth.username.as_bytes();
    let pass = auth.password.as_bytes();
    if user.len() > 255 || pass.len() > 255 {
        return Err(TransportError::Config(
            "socks5: username and password must be at most 255 bytes".into(),
        ));
    }

    let mut req = Vec::with_capacity(3 + user.len() + pass.len());
    req.push(AUTH_VERSION);
    req.push(user.len() as u8);
    req.extend_from_slice(user);
    req.push(pass.len() as u8);
    req.extend_from_slice(pass);
    stream.write_all(&req).await?;

    let mut reply = [0u8; 2];
    stream.read_exact(&mut reply).await?;
    if reply[1] != AUTH_SUCCESS {
        return Err(TransportError::Protocol(
            "socks5: authentication rejected".into(),
        ));
    }
    Ok(())
}

/// Encode `host:port` as ATYP + DST.ADDR + DST.PORT.
fn encode_address(addr: &str) -> Result<Vec<u8>, TransportError> {
    let (host, port) = split_host_port(addr)?;
    let mut buf = Vec::with_capacity(host.len() + 4);
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => {
            buf.push(ATYP_IPV4);
            buf.extend_from_slice(&ip.octets());
        }
        Ok(IpAddr::V6(ip)) => {
            buf.push(ATYP_IPV6);
            buf.extend_from_slice(&ip.octets());
        }
        Err(_) => {
            if host.is_empty() || host.len() > 255 {
                return Err(TransportError::Protocol(format!(
                    "socks5: invalid domain length in {addr}"
                )));
            }
            buf.push(ATYP_DOMAIN);
            buf.push(host.len() as u8);
            buf.extend_from_slice(host.as_bytes());
        }
    }
    buf.extend_from_slice(&port.to_be_bytes());
    Ok(buf)
}

/// Read and discard BND.ADDR and BND.PORT.
async fn skip_bound_address<S: AsyncRead + Unpin>(
    stream: &mut S,
    atyp: u8,
) -> Result<(), TransportError> {
    let len = match atyp {
        ATYP_IPV4 => 4,
        ATYP_IPV6 => 16,
        ATYP_DOMAIN => stream.read_u8().await? as usize,
        other => {
            return Err(TransportError::Protocol(format!(
                "socks5: unknown address type {other:#04x}"
            )));
        }
    };
    let mut buf = vec![0u8; len + 2];
    stream.read_exact(&mut buf).await?;
    Ok(())
}

fn reply_message(code: u8) -> &'static str {
    match code {
        0x01 => "general failure",
        0x02 => "connection not allowed by ruleset",
        0x03 => "network unreachable",
        0x04 => "host unreachable",
        0x05 => "connection refused",
        0x06 => "TTL expired",
        0x07 => "command not supported",
        0x08 => "address type not supported",
        _ => "unknown error",
    }
}

#[async_trait]
impl Connector for Socks5Connector {
    fn init(&mut self, _md: &Metadata) -> Result<(), TransportError> {
        Ok(())
    }

    async fn connect(
        &self,
        mut stream: BoxStream,
        network: Network,
        addr: &str,
    ) -> Result<BoxStream, TransportError> {
        if network != Network::Tcp {
            return Err(TransportError::Unsupported(format!(
                "socks5 connector does not support {network}"
            )));
        }
        debug!(parent: &self.span, addr, "socks5 CONNECT");

        self.negotiate(&mut stream).await?;

        let mut req = vec![SOCKS5_VERSION, CMD_CONNECT, 0x00];
        req.extend(encode_address(addr)?);
        stream.write_all(&req).await?;

        let mut head = [0u8; 4];
        stream.read_exact(&mut head).await?;
        if head[0] != SOCKS5_VERSION {
            return Err(TransportError::Protocol(format!(
                "socks5: unexpected version {:#04x}",
                head[0]
            )));
        }
        if head[1] != REPLY_SUCCEEDED {
            return Err(TransportError::Protocol(format!(
                "socks5: connect to {addr} failed: {}",
                reply_message(head[1])
            )));
        }
        skip_bound_address(&mut stream, head[3]).await?;
        Ok(stream)
    }
}
