//! Nullable tick source: a ledger counter that only moves when told to.

use scholar_types::{Tick, TickSource};
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic tick source for testing.
///
/// Thread-safe so it can drive a shared ledger from several tasks.
pub struct NullTicker {
    current: AtomicU64,
}

impl NullTicker {
    pub fn new(initial: u64) -> Self {
        Self {
            current: AtomicU64::new(initial),
        }
    }

    /// Get the current tick.
    pub fn now(&self) -> Tick {
        Tick::new(self.current.load(Ordering::SeqCst))
    }

    /// Advance by a number of ticks.
    pub fn advance(&self, ticks: u64) {
        self.current.fetch_add(ticks, Ordering::SeqCst);
    }

    /// Jump to a specific tick.
    pub fn set(&self, tick: u64) {
        self.current.store(tick, Ordering::SeqCst);
    }
}

impl Default for NullTicker {
    fn default() -> Self {
        Self::new(0)
    }
}

impl TickSource for NullTicker {
    fn current(&self) -> Tick {
        self.now()
    }
}
