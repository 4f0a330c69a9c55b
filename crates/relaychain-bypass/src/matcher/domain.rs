//! Domain name matchers.
//!
//! - `DomainMatcher`: exact and suffix rules in one `FxHashSet`
//! - `KeywordMatcher`: substring rules through an Aho-Corasick automaton

use aho_corasick::{AhoCorasick, BuildError};
use rustc_hash::FxHashSet;

/// Exact and suffix domain rules.
///
/// Suffix rules are stored with a leading dot (".example.com") next to the
/// bare suffix, so a suffix rule also matches the domain itself. Lookup
/// tries the full name first, then drops labels from the left.
#[derive(Debug, Default)]
pub struct DomainMatcher {
    set: FxHashSet<String>,
}

impl DomainMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_exact(&mut self, domain: &str) {
        self.set.insert(normalize(domain));
    }

    /// Add a suffix rule. `example.com`, `.example.com` and `*.example.com`
    /// are equivalent.
    pub fn add_suffix(&mut self, suffix: &str) {
        let stripped = suffix
            .strip_prefix("*.")
            .or_else(|| suffix.strip_prefix('.'))
            .unwrap_or(suffix);
        let lower = normalize(stripped);
        self.set.insert(format!(".{lower}"));
        self.set.insert(lower);
    }

    pub fn matches(&self, domain: &str) -> bool {
        let lower = normalize(domain);
        if self.set.contains(lower.as_str()) {
            return true;
        }

        let mut pos = 0;
        while let Some(dot) = lower[pos..].find('.') {
            if self.set.contains(&lower[pos + dot..]) {
                return true;
            }
            pos += dot + 1;
        }
        false
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }
}

fn normalize(domain: &str) -> String {
    domain.trim_end_matches('.').to_ascii_lowercase()
}

/// Substring rules over domain names.
pub struct KeywordMatcher {
    ac: AhoCorasick,
    keywords: Vec<String>,
}

impl KeywordMatcher {
    /// Build a matcher; `Ok(None)` when there are no keywords.
    pub fn new(keywords: &[String]) -> Result<Option<Self>, BuildError> {
        if keywords.is_empty() {
            return Ok(None);
        }
        let lower: Vec<String> = keywords.iter().map(|k| k.to_ascii_lowercase()).collect();
        let ac = AhoCorasick::new(&lower)?;
        Ok(Some(Self {
            ac,
            keywords: lower,
        }))
    }

    pub fn matches(&self, domain: &str) -> bool {
        self.ac.is_match(&domain.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl std::fmt::Debug for KeywordMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordMatcher")
            .field("keywords", &self.keywords)
            .finish()
    }
}
