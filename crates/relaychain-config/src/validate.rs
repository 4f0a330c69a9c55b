//! Configuration validation logic.

use std::collections::HashSet;

use crate::Config;
use crate::loader::ConfigError;

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    unique_names("bypass", config.bypasses.iter().map(|b| b.name.as_str()))?;
    unique_names("resolver", config.resolvers.iter().map(|r| r.name.as_str()))?;
    unique_names("hosts", config.hosts.iter().map(|h| h.name.as_str()))?;
    unique_names("chain", config.chains.iter().map(|c| c.name.as_str()))?;

    for chain in &config.chains {
        if let Some(sel) = &chain.selector {
            validate_selector(&format!("chain '{}'", chain.name), sel)?;
        }
        for hop in &chain.hops {
            let hop_scope = format!("chain '{}' hop '{}'", chain.name, hop.name);
            if hop.name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "chain '{}': hop name is empty",
                    chain.name
                )));
            }
            if let Some(sel) = &hop.selector {
                validate_selector(&hop_scope, sel)?;
            }

            for node in &hop.nodes {
                let node_scope = format!("{hop_scope} node '{}'", node.name);
                if node.name.trim().is_empty() {
                    return Err(ConfigError::Validation(format!("{hop_scope}: node name is empty")));
                }
                if node.addr.trim().is_empty() {
                    return Err(ConfigError::Validation(format!("{node_scope}: addr is empty")));
                }
                if node.connector.kind.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "{node_scope}: connector type is empty"
                    )));
                }
                if node.dialer.kind.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "{node_scope}: dialer type is empty"
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Bypass, resolver and hosts names referenced by hops or nodes but not
/// declared in the file.
///
/// These are not errors: an unknown name contributes nothing when the chain
/// is built. Callers may surface them as warnings.
pub fn unresolved_references(config: &Config) -> Vec<String> {
    let declared = References {
        bypasses: config.bypasses.iter().map(|b| b.name.as_str()).collect(),
        resolvers: config.resolvers.iter().map(|r| r.name.as_str()).collect(),
        hosts: config.hosts.iter().map(|h| h.name.as_str()).collect(),
    };

    let mut missing = Vec::new();
    for chain in &config.chains {
        for hop in &chain.hops {
            let hop_scope = format!("chain '{}' hop '{}'", chain.name, hop.name);
            declared.collect(
                &hop_scope,
                hop.bypass.as_deref(),
                &hop.bypasses,
                hop.resolver.as_deref(),
                hop.hosts.as_deref(),
                &mut missing,
            );
            for node in &hop.nodes {
                declared.collect(
                    &format!("{hop_scope} node '{}'", node.name),
                    node.bypass.as_deref(),
                    &node.bypasses,
                    node.resolver.as_deref(),
                    node.hosts.as_deref(),
                    &mut missing,
                );
            }
        }
    }
    missing
}

fn unique_names<'a>(
    kind: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<HashSet<&'a str>, ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{kind} name is empty")));
        }
        if !seen.insert(name) {
            return Err(ConfigError::Validation(format!("duplicate {kind} name: {name}")));
        }
    }
    Ok(seen)
}

fn validate_selector(scope: &str, sel: &crate::SelectorConfig) -> Result<(), ConfigError> {
    if sel.max_fails > 0 && sel.fail_timeout_secs == 0 {
        return Err(ConfigError::Validation(format!(
            "{scope}: selector.fail_timeout_secs must be > 0 when max_fails is set"
        )));
    }
    Ok(())
}

struct References<'a> {
    bypasses: HashSet<&'a str>,
    resolvers: HashSet<&'a str>,
    hosts: HashSet<&'a str>,
}

impl References<'_> {
    fn collect(
        &self,
        scope: &str,
        bypass: Option<&str>,
        bypasses: &[String],
        resolver: Option<&str>,
        hosts: Option<&str>,
        missing: &mut Vec<String>,
    ) {
        for name in bypass.into_iter().chain(bypasses.iter().map(String::as_str)) {
            if !name.is_empty() && !self.bypasses.contains(name) {
                missing.push(format!("{scope}: unknown bypass '{name}'"));
            }
        }
        if let Some(name) = resolver.filter(|n| !n.is_empty())
            && !self.resolvers.contains(name)
        {
            missing.push(format!("{scope}: unknown resolver '{name}'"));
        }
        if let Some(name) = hosts.filter(|n| !n.is_empty())
            && !self.hosts.contains(name)
        {
            missing.push(format!("{scope}: unknown hosts '{name}'"));
        }
    }
}
