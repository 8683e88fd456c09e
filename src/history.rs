//! Bounded history of scored readings.
//!
//! A ring buffer capped at [`History::CAPACITY`] entries; the oldest entry is
//! evicted on overflow. The classifier reads the most recent entries for
//! trend computation, so insertion order must equal arrival order.

use crate::domain::ScoredReading;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<ScoredReading>,
}

impl History {
    /// Maximum retained entries (~40 s at the 0.2 s cadence).
    pub const CAPACITY: usize = 200;
    /// Number of recent entries the trend window spans (~1 s at cadence).
    pub const TREND_WINDOW: usize = 5;

    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(Self::CAPACITY),
        }
    }

    /// Append a scored reading, evicting the oldest entry when full.
    pub fn push(&mut self, scored: ScoredReading) {
        if self.entries.len() == Self::CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(scored);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ScoredReading> {
        self.entries.back()
    }

    /// The oldest and newest entries of the trend window, or `None` while the
    /// history holds fewer than [`Self::TREND_WINDOW`] entries.
    pub fn trend_endpoints(&self) -> Option<(&ScoredReading, &ScoredReading)> {
        if self.entries.len() < Self::TREND_WINDOW {
            return None;
        }
        let oldest = &self.entries[self.entries.len() - Self::TREND_WINDOW];
        let newest = self.entries.back()?;
        Some((oldest, newest))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredReading> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
