//! Node selection for relaychain hops.
//!
//! A [`Selector`] picks one item out of a hop's candidate list per
//! connection attempt. It combines a pluggable [`Strategy`] with two
//! filters applied before the strategy runs:
//!
//! - **fail filter**: items whose [`Marker`] recorded `max_fails` failures
//!   within `fail_timeout` are skipped;
//! - **backup filter**: items flagged as backup are only used when no
//!   primary item survives the fail filter.
//!
//! When the filters remove everything the full list is used, so a
//! non-empty list always yields an item. The [`Selector`] is
//! `Send + Sync + 'static` and is shared across tasks via `Arc`.

pub mod marker;

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use marker::Marker;

// ── Errors ──

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("unknown selector strategy: {0}")]
    UnknownStrategy(String),
}

// ── Strategy identifier ──

/// Selection strategy identifier, as named in configuration files.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    RoundRobin,
    Random,
    Fifo,
    Hash,
}

impl FromStr for StrategyKind {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "round" | "rr" | "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            "random" | "rand" => Ok(Self::Random),
            "fifo" | "ha" => Ok(Self::Fifo),
            "hash" => Ok(Self::Hash),
            other => Err(SelectorError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RoundRobin => "round",
            Self::Random => "random",
            Self::Fifo => "fifo",
            Self::Hash => "hash",
        })
    }
}

// ── Selection inputs ──

/// Something a [`Selector`] can choose.
pub trait Selectable: Send + Sync {
    /// Failure marker consulted by the fail filter.
    fn marker(&self) -> &Marker;

    /// Backup items are only chosen when no primary item is available.
    fn is_backup(&self) -> bool {
        false
    }
}

/// Per-attempt selection context.
#[derive(Debug, Clone, Default)]
pub struct SelectContext {
    /// Affinity key for the hash strategy (typically the client address).
    pub key: Option<String>,
}

impl SelectContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }
}

// ── Strategy trait ──

/// Picks an index into a candidate list of length `len`.
///
/// Returns `None` only when `len == 0`.
pub trait Strategy: Send + Sync + 'static {
    fn pick(&self, len: usize, ctx: &SelectContext) -> Option<usize>;
}

/// Round-robin: cycles through candidates sequentially.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for RoundRobin {
    fn pick(&self, len: usize, _ctx: &SelectContext) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.counter.fetch_add(1, Ordering::Relaxed) % len)
    }
}

/// Uniformly random choice.
#[derive(Debug, Default)]
pub struct Random;

impl Strategy for Random {
    fn pick(&self, len: usize, _ctx: &SelectContext) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(rand::thread_rng().gen_range(0..len))
    }
}

/// First available candidate (high availability ordering).
#[derive(Debug, Default)]
pub struct Fifo;

impl Strategy for Fifo {
    fn pick(&self, len: usize, _ctx: &SelectContext) -> Option<usize> {
        (len > 0).then_some(0)
    }
}

/// Deterministic choice by hashing the context key; random without a key.
#[derive(Debug, Default)]
pub struct KeyHash;

impl Strategy for KeyHash {
    fn pick(&self, len: usize, ctx: &SelectContext) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match &ctx.key {
            Some(key) => {
                let mut hasher = DefaultHasher::new();
                key.hash(&mut hasher);
                Some((hasher.finish() as usize) % len)
            }
            None => Random.pick(len, ctx),
        }
    }
}

// ── Selector ──

/// Strategy plus fail/backup filters.
pub struct Selector {
    strategy: Box<dyn Strategy>,
    kind: StrategyKind,
    max_fails: u32,
    fail_timeout: Duration,
}

impl Selector {
    /// Create a selector using a built-in strategy.
    pub fn new(kind: StrategyKind, max_fails: u32, fail_timeout: Duration) -> Self {
        let strategy: Box<dyn Strategy> = match kind {
            StrategyKind::RoundRobin => Box::new(RoundRobin::new()),
            StrategyKind::Random => Box::new(Random),
            StrategyKind::Fifo => Box::new(Fifo),
            StrategyKind::Hash => Box::new(KeyHash),
        };
        Self::with_strategy(strategy, kind, max_fails, fail_timeout)
    }

    /// Create a selector with a custom strategy.
    pub fn with_strategy(
        strategy: Box<dyn Strategy>,
        kind: StrategyKind,
        max_fails: u32,
        fail_timeout: Duration,
    ) -> Self {
        Self {
            strategy,
            kind,
            max_fails,
            fail_timeout,
        }
    }

    /// Select one item, or `None` if `items` is empty.
    pub fn select<T: Selectable>(&self, items: &[Arc<T>], ctx: &SelectContext) -> Option<Arc<T>> {
        if items.is_empty() {
            return None;
        }

        let alive: Vec<&Arc<T>> = items
            .iter()
            .filter(|item| self.is_available(item.marker()))
            .collect();
        let primary: Vec<&Arc<T>> = alive
            .iter()
            .copied()
            .filter(|item| !item.is_backup())
            .collect();

        let pool = if !primary.is_empty() {
            primary
        } else if !alive.is_empty() {
            alive
        } else {
            // Everything failed recently: fall back to the whole list.
            items.iter().collect()
        };

        let idx = self.strategy.pick(pool.len(), ctx)?;
        pool.get(idx).map(|item| Arc::clone(item))
    }

    fn is_available(&self, marker: &Marker) -> bool {
        if self.max_fails == 0 || marker.fail_count() < self.max_fails {
            return true;
        }
        marker
            .fail_time()
            .is_none_or(|when| when.elapsed() >= self.fail_timeout)
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn max_fails(&self) -> u32 {
        self.max_fails
    }

    pub fn fail_timeout(&self) -> Duration {
        self.fail_timeout
    }
}

impl Default for Selector {
    /// Round-robin with the default fail filter.
    fn default() -> Self {
        Self::new(
            StrategyKind::RoundRobin,
            relaychain_core::DEFAULT_MAX_FAILS,
            Duration::from_secs(relaychain_core::DEFAULT_FAIL_TIMEOUT_SECS),
        )
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("strategy", &self.kind)
            .field("max_fails", &self.max_fails)
            .field("fail_timeout", &self.fail_timeout)
            .finish()
    }
}

// ── Tests ──
