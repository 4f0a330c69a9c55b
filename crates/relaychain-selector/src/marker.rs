//! Per-node failure marker consulted by the fail filter.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use parking_lot::RwLock;

/// Failure bookkeeping for one selectable item.
///
/// Shared by every selection against the item; all updates are atomic so
/// concurrent dial attempts can record outcomes without coordination.
#[derive(Debug, Default)]
pub struct Marker {
    fail_count: AtomicU32,
    fail_time: RwLock<Option<Instant>>,
}

impl Marker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure.
    pub fn mark(&self) {
        self.fail_count.fetch_add(1, Ordering::Relaxed);
        *self.fail_time.write() = Some(Instant::now());
    }

    /// Clear the failure history after a success.
    pub fn reset(&self) {
        self.fail_count.store(0, Ordering::Relaxed);
        *self.fail_time.write() = None;
    }

    pub fn fail_count(&self) -> u32 {
        self.fail_count.load(Ordering::Relaxed)
    }

    /// When the most recent failure was recorded.
    pub fn fail_time(&self) -> Option<Instant> {
        *self.fail_time.read()
    }
}
