//! Round history
//!
//! Completed rounds, newest first, capped at a fixed length.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A single completed round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Round id
    pub id: u64,
    /// Multiplier the round crashed at
    pub crash_value: f64,
    /// Engine clock time (seconds) of the crash
    pub timestamp: f64,
}

/// Colour band used when listing past rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrashTier {
    Low,
    Mid,
    High,
}

impl CrashTier {
    pub fn classify(crash_value: f64) -> Self {
        if crash_value >= 10.0 {
            CrashTier::High
        } else if crash_value >= 2.5 {
            CrashTier::Mid
        } else {
            CrashTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CrashTier::Low => "low",
            CrashTier::Mid => "mid",
            CrashTier::High => "high",
        }
    }
}

/// Aggregate numbers for the stats panel
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryStats {
    pub rounds: usize,
    pub highest: Option<f64>,
    pub average: Option<f64>,
    /// Longest run of consecutive rounds crashing at 2.00x or above
    pub longest_streak: usize,
}

/// Streak threshold for `HistoryStats::longest_streak`
pub const STREAK_THRESHOLD: f64 = 2.0;

/// Bounded history, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl RoundHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Record a completed round, evicting the oldest past capacity
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently completed round
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn stats(&self) -> HistoryStats {
        if self.entries.is_empty() {
            return HistoryStats::default();
        }
        let highest = self
            .entries
            .iter()
            .map(|e| e.crash_value)
            .fold(f64::MIN, f64::max);
        let total: f64 = self.entries.iter().map(|e| e.crash_value).sum();

        let mut longest = 0;
        let mut current = 0;
        for entry in &self.entries {
            if entry.crash_value >= STREAK_THRESHOLD {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 0;
            }
        }

        HistoryStats {
            rounds: self.entries.len(),
            highest: Some(highest),
            average: Some(total / self.entries.len() as f64),
            longest_streak: longest,
        }
    }
}
