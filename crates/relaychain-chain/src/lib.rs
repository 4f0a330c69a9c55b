//! Proxy chain construction and routing.
//!
//! A chain is an ordered list of hops; each hop holds candidate nodes, a
//! selector picking one node per connection and an optional bypass. Each
//! node binds a connector and a dialer into a transport.
//!
//! [`ChainBuilder`] turns a [`ChainConfig`](relaychain_config::ChainConfig)
//! into a [`Chain`] using the components of a
//! [`Registry`](relaychain_registry::Registry). [`Chain::route`] selects the
//! nodes for one connection and [`Route::dial`] opens it.
//!
//! ```rust,no_run
//! # async fn example(config: relaychain_config::Config) -> Result<(), Box<dyn std::error::Error>> {
//! use relaychain_chain::ChainBuilder;
//! use relaychain_registry::Registry;
//! use relaychain_selector::SelectContext;
//! use relaychain_transport::Network;
//!
//! let registry = Registry::builder().with_builtins().load_config(&config)?.build();
//! let chain = ChainBuilder::new(&registry)
//!     .build(config.chain("chain-0"))?
//!     .expect("chain configured");
//! let route = chain.route(&SelectContext::new(), Network::Tcp, "example.com:443");
//! let _stream = route.dial(Network::Tcp, "example.com:443").await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod bypass;
mod chain;
mod error;
mod group;
mod inherit;
mod node;
mod route;
mod select;
mod set;

pub use builder::ChainBuilder;
pub use bypass::compose_bypass;
pub use chain::Chain;
pub use error::ChainError;
pub use group::NodeGroup;
pub use inherit::{InheritedSettings, inherit};
pub use node::{METADATA_BACKUP, Node, NodeBuilder};
pub use route::Route;
pub use select::{default_selector, parse_selector, resolve_selector};
pub use set::ChainSet;
