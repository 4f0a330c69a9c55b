//! Selector resolution for hops.

use std::sync::Arc;
use std::time::Duration;

use relaychain_config::SelectorConfig;
use relaychain_selector::{Selector, StrategyKind};
use tracing::warn;

/// Build a selector from a config block.
///
/// Returns `None` when the block is absent or names no strategy. An unknown
/// strategy falls back to round-robin.
pub fn parse_selector(cfg: Option<&SelectorConfig>) -> Option<Arc<Selector>> {
    let cfg = cfg.filter(|c| !c.strategy.trim().is_empty())?;
    let kind = cfg.strategy.parse::<StrategyKind>().unwrap_or_else(|e| {
        warn!(strategy = %cfg.strategy, error = %e, "falling back to round-robin");
        StrategyKind::RoundRobin
    });
    Some(Arc::new(Selector::new(
        kind,
        cfg.max_fails,
        Duration::from_secs(cfg.fail_timeout_secs),
    )))
}

/// Hop selector if specified, else the chain selector, else the default.
///
/// The chain selector is shared by every hop that falls back to it.
pub fn resolve_selector(
    hop: Option<&SelectorConfig>,
    chain: Option<&Arc<Selector>>,
) -> Arc<Selector> {
    parse_selector(hop)
        .or_else(|| chain.cloned())
        .unwrap_or_else(default_selector)
}

/// Round-robin with a fail filter and a backup filter.
pub fn default_selector() -> Arc<Selector> {
    Arc::new(Selector::default())
}
