//! Bypass composition from named references.

use relaychain_bypass::BypassGroup;
use relaychain_registry::Registry;
use tracing::debug;

/// Union of the bypasses named by `single` and `list`, in that order.
///
/// Names missing from the registry are skipped.
pub fn compose_bypass(registry: &Registry, single: Option<&str>, list: &[String]) -> BypassGroup {
    single
        .into_iter()
        .chain(list.iter().map(String::as_str))
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            let bypass = registry.bypass(name);
            if bypass.is_none() {
                debug!(bypass = name, "bypass not registered, skipped");
            }
            bypass
        })
        .collect()
}
