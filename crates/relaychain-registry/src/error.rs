//! Registry errors.

use relaychain_bypass::BypassError;
use relaychain_resolver::DnsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{kind} '{name}' is already registered")]
    Duplicate { kind: &'static str, name: String },

    #[error(transparent)]
    Bypass(#[from] BypassError),

    #[error("resolver '{name}': {source}")]
    Resolver {
        name: String,
        #[source]
        source: DnsError,
    },
}
