//! Address matchers backing [`MatcherBypass`](crate::MatcherBypass).

pub mod domain;
pub mod ip;

pub use domain::{DomainMatcher, KeywordMatcher};
pub use ip::CidrMatcher;
