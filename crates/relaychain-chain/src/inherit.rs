//! Hop → node inheritance of per-node settings.

use relaychain_config::{HopConfig, NodeConfig, SockOptsConfig};

/// Settings a node may leave unset and take from its hop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InheritedSettings {
    pub resolver: Option<String>,
    pub hosts: Option<String>,
    pub interface: Option<String>,
    pub sockopts: Option<SockOptsConfig>,
}

/// Merge node settings over hop settings, field by field.
///
/// An unset node field (absent or empty) takes the hop value. Socket options
/// are taken as a whole block, never merged per option.
pub fn inherit(node: &NodeConfig, hop: &HopConfig) -> InheritedSettings {
    InheritedSettings {
        resolver: pick(&node.resolver, &hop.resolver),
        hosts: pick(&node.hosts, &hop.hosts),
        interface: pick(&node.interface, &hop.interface),
        sockopts: node.sockopts.or(hop.sockopts),
    }
}

fn pick(node: &Option<String>, hop: &Option<String>) -> Option<String> {
    non_empty(node).or_else(|| non_empty(hop)).map(str::to_string)
}

/// `Some("")` counts as unset.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
