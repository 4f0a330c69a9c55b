//! Error types for the transport crate.

use relaychain_config::MetadataError;
use relaychain_core::AddrError;
use thiserror::Error;

/// Errors that can occur while loading TLS material, initialising
/// components or moving bytes through a hop.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Addr(#[from] AddrError),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("transport has no connector")]
    MissingConnector,

    #[error("transport has no dialer")]
    MissingDialer,
}
