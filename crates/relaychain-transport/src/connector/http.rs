//! HTTP CONNECT connector.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use relaychain_config::Metadata;
use relaychain_core::{DEFAULT_HTTP_USER_AGENT, MAX_HTTP_RESPONSE_BYTES};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use super::{Connector, ConnectorOptions};
use crate::error::TransportError;
use crate::{Auth, BoxStream, Network};

/// Tunnels through an HTTP proxy with `CONNECT`.
///
/// Metadata:
/// - `user_agent`: User-Agent header value
/// - `header`: map of extra request headers
#[derive(Debug)]
pub struct HttpConnector {
    auth: Option<Auth>,
    user_agent: String,
    headers: Vec<(String, String)>,
    span: tracing::Span,
}

impl HttpConnector {
    pub fn new(opts: ConnectorOptions) -> Self {
        Self {
            auth: opts.auth,
            user_agent: DEFAULT_HTTP_USER_AGENT.to_string(),
            headers: Vec::new(),
            span: opts.span,
        }
    }

    fn request(&self, addr: &str) -> String {
        let mut req = format!(
            "CONNECT {addr} HTTP/1.1\r\nHost: {addr}\r\nUser-Agent: {}\r\nProxy-Connection: keep-alive\r\n",
            self.user_agent
        );
        if let Some(auth) = &self.auth {
            let token = STANDARD.encode(format!("{}:{}", auth.username, auth.password));
            req.push_str(&format!("Proxy-Authorization: Basic {token}\r\n"));
        }
        for (name, value) in &self.headers {
            req.push_str(&format!("{name}: {value}\r\n"));
        }
        req.push_str("\r\n");
        req
    }
}

#[async_trait]
impl Connector for HttpConnector {
    fn init(&mut self, md: &Metadata) -> Result<(), TransportError> {
        if let Some(ua) = md.get_string("user_agent")? {
            self.user_agent = ua;
        }
        if let Some(headers) = md.get_string_map("header")? {
            let mut headers: Vec<_> = headers.into_iter().collect();
            headers.sort();
            self.headers = headers;
        }
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
                "http connector does not support {network}"
            )));
        }
        debug!(parent: &self.span, addr, "http CONNECT");

        stream.write_all(self.request(addr).as_bytes()).await?;
        stream.flush().await?;

        let head = read_response_head(&mut stream).await?;
        let status_line = head.lines().next().unwrap_or_default();
        let status = parse_status(status_line)?;
        if !(200..300).contains(&status) {
            return Err(TransportError::Protocol(format!(
                "proxy refused CONNECT to {addr}: {status_line}"
            )));
        }
        Ok(stream)
    }
}

/// Read up to and including the blank line ending the response head.
///
/// Reads byte by byte so no tunnel payload is consumed.
async fn read_response_head<S: AsyncRead + Unpin>(stream: &mut S) -> Result<String, TransportError> {
    let mut head = Vec::with_capacity(128);
    while !head.ends_with(b"\r\n\r\n") {
        if head.len() >= MAX_HTTP_RESPONSE_BYTES {
            return Err(TransportError::Protocol(
                "HTTP response head too large".into(),
            ));
        }
        head.push(stream.read_u8().await?);
    }
    String::from_utf8(head)
        .map_err(|_| TransportError::Protocol("HTTP response head is not UTF-8".into()))
}

fn parse_status(line: &str) -> Result<u16, TransportError> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/1.") => code
            .parse()
            .map_err(|_| TransportError::Protocol(format!("bad HTTP status line: {line}"))),
        _ => Err(TransportError::Protocol(format!("bad HTTP status line: {line}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tokio::io::{AsyncWriteExt, DuplexStream};

    use super::*;
    use crate::tls::{TlsOptions, load_client_config};

    fn connector(auth: Option<Auth>) -> HttpConnector {
        let tls = Arc::new(load_client_config(&TlsOptions::default()).unwrap());
        HttpConnector::new(ConnectorOptions::new(tls).with_auth(auth))
    }

    async fn read_request(server: &mut DuplexStream) -> String {
        read_response_head(server).await.unwrap()
    }

    #[tokio::test]
    async fn connect_with_auth_and_headers() {
        let mut c = connector(Some(Auth {
            username: "user".into(),
            password: "pass".into(),
        }));
        let md: Metadata =
            serde_json::from_value(json!({"user_agent": "test/1", "header": {"X-Id": "7"}}))
                .unwrap();
        c.init(&md).unwrap();

        let (client, mut server) = tokio::io::duplex(1024);
        let proxy = tokio::spawn(async move {
            let req = read_request(&mut server).await;
            server
                .write_all(b"HTTP/1.1 200 Connection established\r\n\r\npayload")
                .await
                .unwrap();
            req
        });

        let mut stream = c
            .connect(Box::new(client), Network::Tcp, "example.com:443")
            .await
            .unwrap();
        let req = proxy.await.unwrap();

        assert!(req.starts_with("CONNECT example.com:443 HTTP/1.1\r\n"));
        assert!(req.contains("Host: example.com:443\r\n"));
        assert!(req.contains("User-Agent: test/1\r\n"));
        assert!(req.contains("Proxy-Authorization: Basic dXNlcjpwYXNz\r\n"));
        assert!(req.contains("X-Id: 7\r\n"));

        let mut rest = [0u8; 7];
        stream.read_exact(&mut rest).await.unwrap();
        assert_eq!(&rest, b"payload");
    }

    #[tokio::test]
    async fn refused_connect() {
        let c = connector(None);
        let (client, mut server) = tokio::io::duplex(1024);
        tokio::spawn(async move {
            let req = read_request(&mut server).await;
            assert!(!req.contains("Proxy-Authorization"));
            server
                .write_all(b"HTTP/1.1 407 Proxy Authentication Required\r\n\r\n")
                .await
                .unwrap();
        });

        let err = c
            .connect(Box::new(client), Network::Tcp, "example.com:443")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, TransportError::Protocol(msg) if msg.contains("407")));
    }

    #[tokio::test]
    async fn udp_is_unsupported() {
        let c = connector(None);
        let (client, _server) = tokio::io::duplex(64);
        let err = c
            .connect(Box::new(client), Network::Udp, "1.1.1.1:53")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, TransportError::Unsupported(_)));
    }

    #[test]
    fn wrongly_typed_metadata_fails_init() {
        let mut c = connector(None);
        let md: Metadata = serde_json::from_value(json!({"header": "X-Id: 7"})).unwrap();
        assert!(matches!(c.init(&md), Err(TransportError::Metadata(_))));

        let md: Metadata = serde_json::from_value(json!({"unknown": [1]})).unwrap();
        c.init(&md).unwrap();
    }

    #[test]
    fn status_line() {
        assert_eq!(parse_status("HTTP/1.0 200 OK").unwrap(), 200);
        assert!(parse_status("SSH-2.0-OpenSSH").is_err());
    }
}
