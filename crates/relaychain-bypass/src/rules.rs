use std::net::IpAddr;

use ipnet::IpNet;
use relaychain_config::BypassConfig;
use relaychain_core::host_of;
use tracing::trace;

use crate::matcher::{CidrMatcher, DomainMatcher, KeywordMatcher};
use crate::{Bypass, BypassError};

const KEYWORD_PREFIX: &str = "keyword:";

/// A named rule set built from a [`BypassConfig`].
///
/// Matcher syntax:
///
/// | pattern            | matches                                  |
/// |--------------------|------------------------------------------|
/// | `10.0.0.1`, `::1`  | that address                             |
/// | `10.0.0.0/8`       | any address in the network               |
/// | `example.com`      | exactly that domain                      |
/// | `.example.com`     | the domain and all of its subdomains     |
/// | `*.example.com`    | same as `.example.com`                   |
/// | `keyword:ads`      | any domain containing `ads`              |
///
/// With `reverse` set the rule set is a whitelist: everything *not*
/// matched is bypassed.
#[derive(Debug)]
pub struct MatcherBypass {
    name: String,
    reverse: bool,
    cidrs: CidrMatcher,
    domains: DomainMatcher,
    keywords: Option<KeywordMatcher>,
}

impl MatcherBypass {
    pub fn from_config(cfg: &BypassConfig) -> Result<Self, BypassError> {
        let mut cidrs = CidrMatcher::new();
        let mut domains = DomainMatcher::new();
        let mut keywords = Vec::new();

        for raw in &cfg.matchers {
            let pattern = raw.trim();
            if pattern.is_empty() {
                return Err(BypassError::EmptyMatcher {
                    bypass: cfg.name.clone(),
                });
            }

            if let Some(keyword) = pattern.strip_prefix(KEYWORD_PREFIX) {
                let keyword = keyword.trim();
                if keyword.is_empty() {
                    return Err(BypassError::InvalidKeyword {
                        bypass: cfg.name.clone(),
                        matcher: raw.clone(),
                    });
                }
                keywords.push(keyword.to_string());
            } else if pattern.contains('/') {
                let net = pattern
                    .parse::<IpNet>()
                    .map_err(|_| BypassError::InvalidCidr {
                        bypass: cfg.name.clone(),
                        matcher: raw.clone(),
                    })?;
                cidrs.add_net(net);
            } else if let Ok(ip) = host_of(pattern).parse::<IpAddr>() {
                cidrs.add_ip(ip);
            } else if pattern.starts_with('.') || pattern.starts_with("*.") {
                domains.add_suffix(pattern);
            } else {
                domains.add_exact(pattern);
            }
        }
        cidrs.finish();

        let keywords =
            KeywordMatcher::new(&keywords).map_err(|_| BypassError::InvalidKeyword {
                bypass: cfg.name.clone(),
                matcher: keywords.join(","),
            })?;

        Ok(Self {
            name: cfg.name.clone(),
            reverse: cfg.reverse,
            cidrs,
            domains,
            keywords,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    fn matches_host(&self, host: &str) -> bool {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return self.cidrs.contains(ip);
        }
        self.domains.matches(host) || self.keywords.as_ref().is_some_and(|k| k.matches(host))
    }
}

impl Bypass for MatcherBypass {
    fn contains(&self, addr: &str) -> bool {
        if addr.is_empty() {
            return false;
        }
        let host = host_of(addr);
        let matched = self.matches_host(host) != self.reverse;
        if matched {
            trace!(bypass = %self.name, addr, "bypass matched");
        }
        matched
    }
}
