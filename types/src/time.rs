//! Ledger ticks: the externally supplied ordinal counter that bounds
//! voting windows.
//!
//! A tick is not wall-clock time. The governance engine never reads a clock
//! of its own; whoever drives the ledger decides what a tick means (block
//! height, round number, ...), and hands it in through a [`TickSource`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position on the ledger's monotonic ordinal counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tick(u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(n: u64) -> Self {
        Self(n)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn saturating_add(&self, ticks: u64) -> Self {
        Self(self.0.saturating_add(ticks))
    }

    /// Whether `self` lies in the half-open window `[start, end)`.
    pub fn within(&self, start: Tick, end: Tick) -> bool {
        start <= *self && *self < end
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Supplies the current tick to the ledger.
pub trait TickSource: Send + Sync {
    fn current(&self) -> Tick;
}
