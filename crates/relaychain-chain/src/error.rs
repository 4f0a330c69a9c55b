//! Chain construction and dial errors.

use relaychain_config::MetadataError;
use relaychain_resolver::DnsError;
use relaychain_transport::TransportError;
use thiserror::Error;

/// Any error means "no usable chain" (when building) or "no connection"
/// (when dialing).
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("load TLS config: {0}")]
    Tls(#[source] TransportError),

    #[error("unknown connector type '{0}'")]
    UnknownConnector(String),

    #[error("unknown dialer type '{0}'")]
    UnknownDialer(String),

    #[error("connector '{connector}' init: {source}")]
    ConnectorInit {
        connector: String,
        #[source]
        source: TransportError,
    },

    #[error("dialer '{dialer}' init: {source}")]
    DialerInit {
        dialer: String,
        #[source]
        source: TransportError,
    },

    #[error("node '{node}': {source}")]
    Metadata {
        node: String,
        #[source]
        source: MetadataError,
    },

    #[error("transport: {0}")]
    Transport(#[source] TransportError),

    #[error("duplicate chain name '{0}'")]
    DuplicateChain(String),

    /// The route cannot carry the requested network.
    #[error("no route")]
    NoRoute,

    #[error(transparent)]
    Resolve(#[from] DnsError),

    #[error("node '{node}': {source}")]
    Dial {
        node: String,
        #[source]
        source: TransportError,
    },
}
