//! Shared fixtures for chain integration tests.
#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use relaychain_config::{Config, Metadata};
use relaychain_registry::Registry;
use relaychain_transport::{
    BoxStream, Connector, ConnectorOptions, DialOptions, Dialer, DialerOptions, Network,
    TransportError,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Ordered record of every mock call.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

fn check_init(md: &Metadata) -> Result<(), TransportError> {
    if md.get_bool("fail")?.unwrap_or(false) {
        return Err(TransportError::Config("init rejected".into()));
    }
    Ok(())
}

pub struct MockConnector {
    journal: Journal,
}

#[async_trait]
impl Connector for MockConnector {
    fn init(&mut self, md: &Metadata) -> Result<(), TransportError> {
        check_init(md)
    }

    async fn connect(
        &self,
        stream: BoxStream,
        network: Network,
        addr: &str,
    ) -> Result<BoxStream, TransportError> {
        self.journal.push(format!("connect {network} {addr}"));
        Ok(stream)
    }
}

/// Dials in memory. Addresses in 10.255.0.0/16 refuse connections.
pub struct MockDialer {
    journal: Journal,
}

#[async_trait]
impl Dialer for MockDialer {
    fn init(&mut self, md: &Metadata) -> Result<(), TransportError> {
        check_init(md)
    }

    async fn dial(&self, addr: &str, _opts: &DialOptions) -> Result<BoxStream, TransportError> {
        self.journal.push(format!("dial {addr}"));
        if addr.starts_with("10.255.") {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused").into());
        }
        let (near, _far) = tokio::io::duplex(64);
        Ok(Box::new(near))
    }

    async fn handshake(&self, stream: BoxStream, addr: &str) -> Result<BoxStream, TransportError> {
        self.journal.push(format!("handshake {addr}"));
        Ok(stream)
    }
}

/// Built-ins plus `mock` connector and dialer types writing to `journal`.
pub fn registry(config: &Config, journal: &Journal) -> Registry {
    let (cj, dj) = (journal.clone(), journal.clone());
    Registry::builder()
        .with_builtins()
        .register_connector("mock", move |_: ConnectorOptions| -> Box<dyn Connector> {
            Box::new(MockConnector {
                journal: cj.clone(),
            })
        })
        .unwrap()
        .register_dialer("mock", move |_: DialerOptions| -> Box<dyn Dialer> {
            Box::new(MockDialer {
                journal: dj.clone(),
            })
        })
        .unwrap()
        .load_config(config)
        .unwrap()
        .build()
}

pub fn config(yaml: &str) -> Config {
    serde_yaml::from_str(yaml).unwrap()
}

/// TCP server echoing every connection back.
pub async fn echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                loop {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if stream.write_all(&buf[..n]).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }
    });
    addr
}
