//! Running aggregates over completed checkpoints.

use crate::record::CheckpointStats;
use serde::{Deserialize, Serialize};

/// Running min/max/average over a series of non-negative samples.
///
/// The average is derived from an exact running sum and count; the update
/// is O(1) and a late large sample cannot lose precision the way
/// incremental averaging of a skewed series does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinMaxAvgStats {
    min: i64,
    max: i64,
    sum: i64,
    count: u64,
}

impl MinMaxAvgStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample. Negative samples are rejected by the tracker
    /// before they reach the aggregate; one slipping through is ignored.
    pub fn update(&mut self, sample: i64) {
        if sample < 0 {
            return;
        }
        if self.count == 0 {
            self.min = sample;
            self.max = sample;
        } else {
            self.min = self.min.min(sample);
            self.max = self.max.max(sample);
        }
        self.sum += sample;
        self.count += 1;
    }

    /// Smallest sample seen, -1 with no samples.
    pub fn min(&self) -> i64 {
        if self.count == 0 {
            -1
        } else {
            self.min
        }
    }

    /// Largest sample seen, -1 with no samples.
    pub fn max(&self) -> i64 {
        if self.count == 0 {
            -1
        } else {
            self.max
        }
    }

    /// Mean over all samples, -1 with no samples.
    pub fn average(&self) -> i64 {
        if self.count == 0 {
            -1
        } else {
            self.sum / self.count as i64
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Aggregates over all completed checkpoints of a job.
///
/// Failed attempts contribute no samples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointStatsSummary {
    state_size: MinMaxAvgStats,
    end_to_end_duration: MinMaxAvgStats,
    alignment_buffered: MinMaxAvgStats,
}

impl CheckpointStatsSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one completed checkpoint into the aggregates.
    ///
    /// The duration sample is skipped when the record never saw an
    /// acknowledgment (duration sentinel -1).
    pub fn observe(&mut self, completed: &CheckpointStats) {
        self.state_size.update(completed.state_size);
        let duration = completed.end_to_end_duration();
        if duration >= 0 {
            self.end_to_end_duration.update(duration);
        }
        self.alignment_buffered.update(completed.alignment_buffered);
    }

    pub fn state_size(&self) -> &MinMaxAvgStats {
        &self.state_size
    }

    pub fn end_to_end_duration(&self) -> &MinMaxAvgStats {
        &self.end_to_end_duration
    }

    pub fn alignment_buffered(&self) -> &MinMaxAvgStats {
        &self.alignment_buffered
    }
}
