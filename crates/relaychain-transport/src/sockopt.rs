//! Socket options applied to outbound sockets.

use relaychain_config::SockOptsConfig;
use socket2::Socket;

/// Outbound socket options.
///
/// `None` at the transport level means "no options"; `Some` with a zero mark
/// is a present block that leaves the mark unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SockOpts {
    /// SO_MARK routing mark (Linux only).
    pub mark: u32,
}

impl From<SockOptsConfig> for SockOpts {
    fn from(cfg: SockOptsConfig) -> Self {
        Self { mark: cfg.mark }
    }
}

impl SockOpts {
    /// Apply the options to a socket before it connects.
    #[cfg(any(target_os = "android", target_os = "fuchsia", target_os = "linux"))]
    pub fn apply(&self, socket: &Socket) -> std::io::Result<()> {
        if self.mark != 0 {
            socket.set_mark(self.mark)?;
        }
        Ok(())
    }

    #[cfg(not(any(target_os = "android", target_os = "fuchsia", target_os = "linux")))]
    pub fn apply(&self, _socket: &Socket) -> std::io::Result<()> {
        if self.mark != 0 {
            tracing::debug!(mark = self.mark, "SO_MARK is not supported on this platform");
        }
        Ok(())
    }
}

/// Bind a socket to a network interface.
#[cfg(any(target_os = "android", target_os = "fuchsia", target_os = "linux"))]
pub fn bind_interface(socket: &Socket, interface: &str) -> std::io::Result<()> {
    socket.bind_device(Some(interface.as_bytes()))
}

#[cfg(not(any(target_os = "android", target_os = "fuchsia", target_os = "linux")))]
pub fn bind_interface(_socket: &Socket, interface: &str) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        format!("binding to interface '{interface}' is not supported on this platform"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use socket2::{Domain, Protocol, Type};

    #[test]
    fn from_config() {
        assert_eq!(SockOpts::from(SockOptsConfig { mark: 7 }), SockOpts { mark: 7 });
    }

    #[test]
    fn zero_mark_is_a_no_op() {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).unwrap();
        SockOpts::default().apply(&socket).unwrap();
    }
}
