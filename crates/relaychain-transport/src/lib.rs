//! Transport layer for relaychain nodes.
//!
//! A node reaches its proxy through a [`Dialer`] (how the byte stream is
//! established) and then speaks a proxy protocol over it through a
//! [`Connector`]. The pair, together with the node address and socket
//! settings, is bound into a [`Transport`].
//!
//! # Built-ins
//!
//! - dialers: [`dialer::TcpDialer`] (`tcp`), [`dialer::TlsDialer`] (`tls`)
//! - connectors: [`connector::ForwardConnector`] (`forward`),
//!   [`connector::HttpConnector`] (`http`), [`connector::Socks5Connector`]
//!   (`socks5`)

pub mod connector;
pub mod dialer;
pub mod error;
pub mod sockopt;
pub mod tls;
mod transport;

use std::fmt;
use std::str::FromStr;

use relaychain_config::AuthConfig;
use tokio::io::{AsyncRead, AsyncWrite};

pub use connector::{Connector, ConnectorOptions};
pub use dialer::{DialOptions, Dialer, DialerOptions};
pub use error::TransportError;
pub use sockopt::SockOpts;
pub use tls::{ClientTlsConfig, TlsOptions, load_client_config};
pub use transport::{Transport, TransportBuilder};

/// Marker trait for streams that can be carried through a chain.
pub trait TransportStream: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send + 'static> TransportStream for T {}

/// Type-erased stream handed from hop to hop.
pub type BoxStream = Box<dyn TransportStream>;

/// Network of the connection requested through a chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Network {
    #[default]
    Tcp,
    Udp,
}

impl FromStr for Network {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" | "tcp4" | "tcp6" => Ok(Self::Tcp),
            "udp" | "udp4" | "udp6" => Ok(Self::Udp),
            other => Err(TransportError::Unsupported(format!("network '{other}'"))),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        })
    }
}

/// Credentials presented to a proxy.
#[derive(Clone, PartialEq, Eq)]
pub struct Auth {
    pub username: String,
    pub password: String,
}

impl From<&AuthConfig> for Auth {
    fn from(cfg: &AuthConfig) -> Self {
        Self {
            username: cfg.username.clone(),
            password: cfg.password.clone(),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_parse() {
        assert_eq!("TCP".parse::<Network>().unwrap(), Network::Tcp);
        assert_eq!("udp6".parse::<Network>().unwrap(), Network::Udp);
        assert!("sctp".parse::<Network>().is_err());
        assert_eq!(Network::default().to_string(), "tcp");
    }

    #[test]
    fn auth_debug_hides_password() {
        let auth = Auth::from(&AuthConfig {
            username: "alice".into(),
            password: "hunter2".into(),
        });
        let printed = format!("{auth:?}");
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));
    }
}
