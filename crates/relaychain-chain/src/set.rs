//! Named chains with atomic rebuild.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use arc_swap::ArcSwap;
use relaychain_config::ChainConfig;
use relaychain_core::ERROR_CONFIG;
use relaychain_registry::Registry;
use tracing::{error, info};

use crate::builder::ChainBuilder;
use crate::chain::Chain;
use crate::error::ChainError;

type ChainMap = HashMap<String, Arc<Chain>>;

/// Every configured chain, by name.
///
/// Readers get a consistent snapshot; [`ChainSet::reload`] replaces the whole
/// map at once.
pub struct ChainSet {
    chains: ArcSwap<ChainMap>,
}

impl ChainSet {
    /// Build every chain in `configs`. Any failure fails the whole set.
    pub fn build(registry: &Registry, configs: &[ChainConfig]) -> Result<Self, ChainError> {
        let chains = build_map(registry, configs)?;
        Ok(Self {
            chains: ArcSwap::from_pointee(chains),
        })
    }

    /// Rebuild from `configs`. On failure the current chains stay in place.
    pub fn reload(&self, registry: &Registry, configs: &[ChainConfig]) -> Result<(), ChainError> {
        let chains = build_map(registry, configs)?;
        let count = chains.len();
        self.chains.store(Arc::new(chains));
        info!(chains = count, "chains reloaded");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<Chain>> {
        self.chains.load().get(name).cloned()
    }

    /// Chain names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.chains.load().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.chains.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.load().is_empty()
    }
}

impl std::fmt::Debug for ChainSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainSet")
            .field("chains", &self.names())
            .finish()
    }
}

fn build_map(registry: &Registry, configs: &[ChainConfig]) -> Result<ChainMap, ChainError> {
    let builder = ChainBuilder::new(registry);
    let mut chains = ChainMap::with_capacity(configs.len());
    for cfg in configs {
        let Some(chain) = builder.build(Some(cfg))? else {
            continue;
        };
        match chains.entry(cfg.name.clone()) {
            Entry::Occupied(_) => {
                error!(kind = ERROR_CONFIG, chain = %cfg.name, "duplicate chain name");
                return Err(ChainError::DuplicateChain(cfg.name.clone()));
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(chain));
            }
        }
    }
    Ok(chains)
}
