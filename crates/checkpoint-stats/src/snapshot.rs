//! Point-in-time view of a job's checkpoint statistics.

use crate::counts::CheckpointStatsCounts;
use crate::history::CheckpointStatsHistory;
use crate::record::RestoredCheckpointStats;
use crate::summary::CheckpointStatsSummary;
use serde::{Deserialize, Serialize};

/// Immutable copy of the tracker state, captured atomically.
///
/// Snapshots are plain values with no back-reference to the tracker: they
/// can be read from any number of threads without synchronization and
/// outlive any further tracker mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointStatsSnapshot {
    counts: CheckpointStatsCounts,
    summary: CheckpointStatsSummary,
    history: CheckpointStatsHistory,
    latest_restored: Option<RestoredCheckpointStats>,
}

impl CheckpointStatsSnapshot {
    pub(crate) fn new(
        counts: CheckpointStatsCounts,
        summary: CheckpointStatsSummary,
        history: CheckpointStatsHistory,
        latest_restored: Option<RestoredCheckpointStats>,
    ) -> Self {
        Self {
            counts,
            summary,
            history,
            latest_restored,
        }
    }

    pub fn counts(&self) -> &CheckpointStatsCounts {
        &self.counts
    }

    pub fn summary(&self) -> &CheckpointStatsSummary {
        &self.summary
    }

    pub fn history(&self) -> &CheckpointStatsHistory {
        &self.history
    }

    pub fn latest_restored(&self) -> Option<&RestoredCheckpointStats> {
        self.latest_restored.as_ref()
    }
}
