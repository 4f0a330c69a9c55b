//! Core types and constants shared across relaychain crates.
//!
//! This crate provides:
//! - Default configuration values
//! - Error kind constants for logging
//! - `host:port` address helpers

pub mod addr;
pub mod defaults;
pub mod errors;

// Re-export commonly used items at crate root
pub use addr::{AddrError, host_of, split_host_port};
pub use defaults::*;
pub use errors::*;

/// Project name.
pub const PROJECT_NAME: &str = "relaychain";
/// Project version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
