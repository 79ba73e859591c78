//! Running totals of checkpoint attempts by lifecycle state.

use serde::{Deserialize, Serialize};

/// Counts of checkpoint attempts, by lifecycle state, since the job
/// started.
///
/// Invariant: `total == in_progress + completed + failed` after every
/// tracker operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointStatsCounts {
    num_restored: u64,
    num_total: u64,
    num_in_progress: u64,
    num_completed: u64,
    num_failed: u64,
}

impl CheckpointStatsCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checkpoints the job resumed from.
    pub fn restored(&self) -> u64 {
        self.num_restored
    }

    /// All attempts, regardless of outcome.
    pub fn total(&self) -> u64 {
        self.num_total
    }

    pub fn in_progress(&self) -> u64 {
        self.num_in_progress
    }

    pub fn completed(&self) -> u64 {
        self.num_completed
    }

    pub fn failed(&self) -> u64 {
        self.num_failed
    }

    pub(crate) fn increment_in_progress(&mut self) {
        self.num_in_progress += 1;
        self.num_total += 1;
    }

    pub(crate) fn increment_completed(&mut self) {
        debug_assert!(self.num_in_progress > 0);
        self.num_in_progress -= 1;
        self.num_completed += 1;
    }

    pub(crate) fn increment_failed(&mut self) {
        debug_assert!(self.num_in_progress > 0);
        self.num_in_progress -= 1;
        self.num_failed += 1;
    }

    pub(crate) fn increment_restored(&mut self) {
        self.num_restored += 1;
    }
}
