//! # relaychain
//!
//! Multi-hop proxy chain construction and routing.
//!
//! ## Crates
//!
//! - [`relaychain_core`] - Defaults, logging error kinds and address helpers
//! - [`relaychain_config`] - Configuration loading and validation
//! - [`relaychain_selector`] - Node selection strategies and failure markers
//! - [`relaychain_bypass`] - Address bypass rule sets
//! - [`relaychain_transport`] - Connectors, dialers and TLS client config
//! - [`relaychain_resolver`] - DNS resolvers and static host tables
//! - [`relaychain_registry`] - Component registry
//! - [`relaychain_chain`] - Chain building, routing and dialing

pub mod cli;

pub use relaychain_bypass as bypass;
pub use relaychain_chain as chain;
pub use relaychain_config as config;
pub use relaychain_core as core;
pub use relaychain_registry as registry;
pub use relaychain_resolver as resolver;
pub use relaychain_selector as selector;
pub use relaychain_transport as transport;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use relaychain_chain::{Chain, ChainBuilder, ChainError, ChainSet, Route};
    pub use relaychain_config::{Config, load_config, validate_config};
    pub use relaychain_registry::Registry;
    pub use relaychain_selector::SelectContext;
    pub use relaychain_transport::Network;
}
