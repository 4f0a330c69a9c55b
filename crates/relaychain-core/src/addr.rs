//! `host:port` address helpers.

use thiserror::Error;

/// Malformed address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddrError {
    #[error("missing port in address: {0}")]
    MissingPort(String),

    #[error("invalid port in address: {0}")]
    InvalidPort(String),

    #[error("invalid address: {0}")]
    Invalid(String),
}

/// Split `"host:port"` into (host, port).
///
/// Handles IPv6 bracket notation: `"[::1]:443"` → `("::1", 443)`.
pub fn split_host_port(addr: &str) -> Result<(&str, u16), AddrError> {
    if let Some(rest) = addr.strip_prefix('[') {
        if let Some((host, port_str)) = rest.split_once("]:") {
            let port = port_str
                .parse::<u16>()
                .map_err(|_| AddrError::InvalidPort(addr.to_string()))?;
            return Ok((host, port));
        }
        return Err(AddrError::Invalid(addr.to_string()));
    }

    match addr.rsplit_once(':') {
        // A bare IPv6 literal has more than one colon and no brackets.
        Some((host, _)) if host.contains(':') => Err(AddrError::Invalid(addr.to_string())),
        Some((host, port_str)) => {
            let port = port_str
                .parse::<u16>()
                .map_err(|_| AddrError::InvalidPort(addr.to_string()))?;
            Ok((host, port))
        }
        None => Err(AddrError::MissingPort(addr.to_string())),
    }
}

/// Host part of an address, tolerating a missing port.
///
/// `"example.com:443"` → `"example.com"`, `"[::1]:80"` → `"::1"`,
/// `"10.0.0.1"` → `"10.0.0.1"`, `"::1"` → `"::1"`.
pub fn host_of(addr: &str) -> &str {
    if let Ok((host, _)) = split_host_port(addr) {
        return host;
    }
    if let Some(stripped) = addr.strip_prefix('[') {
        return stripped.strip_suffix(']').unwrap_or(stripped);
    }
    addr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_hostname_and_port() {
        assert_eq!(split_host_port("example.com:443").unwrap(), ("example.com", 443));
        assert_eq!(split_host_port("10.0.0.1:8080").unwrap(), ("10.0.0.1", 8080));
    }

    #[test]
    fn split_bracketed_ipv6() {
        assert_eq!(split_host_port("[::1]:443").unwrap(), ("::1", 443));
        assert_eq!(
            split_host_port("[2001:db8::1]:8443").unwrap(),
            ("2001:db8::1", 8443)
        );
    }

    #[test]
    fn split_rejects_bad_input() {
        assert_eq!(
            split_host_port("example.com"),
            Err(AddrError::MissingPort("example.com".into()))
        );
        assert!(matches!(
            split_host_port("example.com:http"),
            Err(AddrError::InvalidPort(_))
        ));
        assert!(split_host_port("[::1]").is_err());
        assert!(split_host_port("2001:db8::1").is_err());
    }

    #[test]
    fn host_of_tolerates_missing_port() {
        assert_eq!(host_of("example.com:443"), "example.com");
        assert_eq!(host_of("example.com"), "example.com");
        assert_eq!(host_of("[::1]:80"), "::1");
        assert_eq!(host_of("[::1]"), "::1");
        assert_eq!(host_of("2001:db8::1"), "2001:db8::1");
        assert_eq!(host_of("192.168.1.1"), "192.168.1.1");
    }
}
