//! Default configuration values.
//!
//! Centralized default constants for use across all crates.

// ============================================================================
// Component Defaults
// ============================================================================

/// Connector type used when a node does not name one.
pub const DEFAULT_CONNECTOR_TYPE: &str = "http";
/// Dialer type used when a node does not name one.
pub const DEFAULT_DIALER_TYPE: &str = "tcp";

// ============================================================================
// Selector Defaults
// ============================================================================

/// Default node selection strategy name.
pub const DEFAULT_SELECTOR_STRATEGY: &str = "round";
/// Default failures before a node is filtered out.
pub const DEFAULT_MAX_FAILS: u32 = 1;
/// Default time a failed node stays filtered, in seconds.
pub const DEFAULT_FAIL_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// TCP Dialer Defaults
// ============================================================================

/// Default TCP_NODELAY for dialed connections.
pub const DEFAULT_TCP_NO_DELAY: bool = true;
/// Default TCP keep-alive interval in seconds (0 = disabled).
pub const DEFAULT_TCP_KEEPALIVE_SECS: u64 = 0;
/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default TLS handshake timeout in seconds.
pub const DEFAULT_TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// DNS Defaults
// ============================================================================

/// Default DNS cache capacity.
pub const DEFAULT_DNS_CACHE_SIZE: usize = 256;

// ============================================================================
// Connector Defaults
// ============================================================================

/// Default User-Agent sent by the HTTP CONNECT connector.
pub const DEFAULT_HTTP_USER_AGENT: &str = "relaychain/0.3";
/// Upper bound on an HTTP CONNECT response header block.
pub const MAX_HTTP_RESPONSE_BYTES: usize = 8192;

// ============================================================================
// Logging Defaults
// ============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
