//! DNS resolver errors.

use relaychain_core::AddrError;

/// Errors from name resolution.
#[derive(Debug, thiserror::Error)]
pub enum DnsError {
    /// Lookup returned no addresses.
    #[error("dns lookup returned no results for {0}")]
    NoResults(String),

    #[error("dns lookup failed: {0}")]
    Lookup(#[from] hickory_resolver::ResolveError),

    #[error(transparent)]
    InvalidAddress(#[from] AddrError),

    /// Invalid DNS server URL.
    #[error("invalid dns server url: {0}")]
    InvalidServer(String),
}
