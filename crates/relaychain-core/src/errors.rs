//! Error kind constants for structured logging.
//!
//! Attached as the `kind` field on failure events so log pipelines can
//! classify chain construction and dial failures consistently.

/// TLS material could not be loaded.
pub const ERROR_TLS: &str = "tls";
/// A component type name is not registered.
pub const ERROR_REGISTRY: &str = "registry";
/// A connector or dialer rejected its metadata.
pub const ERROR_INIT: &str = "init";
/// DNS/address resolution error.
pub const ERROR_RESOLVE: &str = "resolve";
/// Dial or connect through a hop failed.
pub const ERROR_DIAL: &str = "dial";
/// Configuration error.
pub const ERROR_CONFIG: &str = "config";
