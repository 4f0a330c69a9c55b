//! Bypass rule sets for relaychain.
//!
//! A bypass decides whether a destination skips a hop (or a node). Rule sets
//! are declared by name in configuration and built once into
//! [`MatcherBypass`] values; hops and nodes reference several of them, which
//! are combined into a [`BypassGroup`] that matches when any member does.

mod error;
mod group;
pub mod matcher;
mod rules;

use std::fmt;

pub use error::BypassError;
pub use group::BypassGroup;
pub use rules::MatcherBypass;

/// Predicate over destination addresses (`host:port` or a bare host).
pub trait Bypass: Send + Sync + fmt::Debug {
    /// Returns true if traffic to `addr` should not go through this hop.
    fn contains(&self, addr: &str) -> bool;
}
