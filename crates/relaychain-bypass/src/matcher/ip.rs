//! IP and CIDR matcher.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

/// Matches IP addresses against a set of networks.
///
/// Single addresses are stored as host networks (`/32`, `/128`). Lookup is a
/// linear scan per address family.
#[derive(Debug, Default)]
pub struct CidrMatcher {
    v4: Vec<Ipv4Net>,
    v6: Vec<Ipv6Net>,
}

impl CidrMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a network.
    pub fn add_net(&mut self, net: IpNet) {
        match net.trunc() {
            IpNet::V4(n) => self.v4.push(n),
            IpNet::V6(n) => self.v6.push(n),
        }
    }

    /// Add a single address.
    pub fn add_ip(&mut self, ip: IpAddr) {
        self.add_net(IpNet::from(ip));
    }

    /// Sort and deduplicate after all entries were added.
    pub fn finish(&mut self) {
        self.v4.sort();
        self.v4.dedup();
        self.v6.sort();
        self.v6.dedup();
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        match ip {
            IpAddr::V4(v4) => self.contains_v4(v4),
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => self.contains_v4(v4),
                None => self.contains_v6(v6),
            },
        }
    }

    fn contains_v4(&self, addr: Ipv4Addr) -> bool {
        self.v4.iter().any(|net| net.contains(&addr))
    }

    fn contains_v6(&self, addr: Ipv6Addr) -> bool {
        self.v6.iter().any(|net| net.contains(&addr))
    }

    pub fn is_empty(&self) -> bool {
        self.v4.is_empty() && self.v6.is_empty()
    }

    pub fn len(&self) -> usize {
        self.v4.len() + self.v6.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(nets: &[&str]) -> CidrMatcher {
        let mut m = CidrMatcher::new();
        for net in nets {
            m.add_net(net.parse().unwrap());
        }
        m.finish();
        m
    }

    #[test]
    fn private_ranges() {
        let m = matcher(&["192.168.0.0/16", "10.0.0.0/8"]);
        assert!(m.contains(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1))));
        assert!(m.contains(IpAddr::V4(Ipv4Addr::new(10, 255, 255, 255))));
        assert!(!m.contains(IpAddr::V4(Ipv4Addr::new(172, 16, 0, 1))));
        assert!(!m.contains(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))));
    }

    #[test]
    fn single_address() {
        let mut m = CidrMatcher::new();
        m.add_ip(IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4)));
        assert!(m.contains(IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4))));
        assert!(!m.contains(IpAddr::V4(Ipv4Addr::new(1, 2, 3, 5))));
    }

    #[test]
    fn ipv6_and_mapped_ipv4() {
        let m = matcher(&["2001:db8::/32", "127.0.0.0/8"]);
        assert!(m.contains(IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1))));
        assert!(!m.contains(IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb9, 0, 0, 0, 0, 0, 1))));
        assert!(m.contains("::ffff:127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn host_bits_are_truncated_and_deduplicated() {
        let m = matcher(&["10.1.2.3/8", "10.0.0.0/8"]);
        assert_eq!(m.len(), 1);
        assert!(m.contains(IpAddr::V4(Ipv4Addr::new(10, 9, 9, 9))));
    }

    #[test]
    fn empty() {
        let m = CidrMatcher::new();
        assert!(m.is_empty());
        assert!(!m.contains(IpAddr::V4(Ipv4Addr::LOCALHOST)));
    }
}
