//! Mutable accumulation of checkpoint lifecycle events.

use crate::config::CheckpointStatsConfig;
use crate::counts::CheckpointStatsCounts;
use crate::history::CheckpointStatsHistory;
use crate::record::{CheckpointStats, CheckpointStatsStatus, RestoredCheckpointStats};
use crate::snapshot::CheckpointStatsSnapshot;
use crate::summary::CheckpointStatsSummary;
use flywheel_core::{CheckpointProperties, Timestamp};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Collects checkpoint statistics for one job.
///
/// Fed by the checkpoint coordinator's lifecycle events and read by report
/// requests. Counts, aggregates, and history live behind a single lock so
/// a snapshot always observes them in a consistent joint state.
///
/// Per tracked id the reports follow
/// `triggered -> acknowledged* -> completed | failed`; anything outside
/// that order is dropped without touching the state. Acknowledgments for a
/// checkpoint that already reached a terminal state are expected under
/// network reordering and dropped silently.
pub struct CheckpointStatsTracker {
    inner: RwLock<TrackerInner>,
}

#[derive(Debug)]
struct TrackerInner {
    counts: CheckpointStatsCounts,
    summary: CheckpointStatsSummary,
    history: CheckpointStatsHistory,
    /// In-progress records by id. The authoritative copy: the ring may
    /// evict its entry early, a terminal report must still resolve.
    in_progress: HashMap<u64, CheckpointStats>,
    latest_restored: Option<RestoredCheckpointStats>,
}

impl CheckpointStatsTracker {
    pub fn new(config: CheckpointStatsConfig) -> Self {
        Self {
            inner: RwLock::new(TrackerInner {
                counts: CheckpointStatsCounts::new(),
                summary: CheckpointStatsSummary::new(),
                history: CheckpointStatsHistory::new(config.num_remembered_checkpoints),
                in_progress: HashMap::new(),
                latest_restored: None,
            }),
        }
    }

    /// Track a newly triggered checkpoint.
    pub fn report_triggered(
        &self,
        id: u64,
        trigger_timestamp: Timestamp,
        properties: CheckpointProperties,
        num_subtasks: u32,
    ) {
        if trigger_timestamp < 0 {
            warn!(
                checkpoint_id = id,
                trigger_timestamp, "Rejecting trigger report with negative timestamp"
            );
            return;
        }

        let mut inner = self.inner.write();
        if inner.in_progress.contains_key(&id) {
            debug!(checkpoint_id = id, "Dropping duplicate trigger report");
            return;
        }

        let record = CheckpointStats::new_in_progress(id, trigger_timestamp, properties, num_subtasks);
        inner.history.add_in_progress(record.clone());
        inner.in_progress.insert(id, record);
        inner.counts.increment_in_progress();
        debug!(checkpoint_id = id, num_subtasks, "Tracking triggered checkpoint");
    }

    /// Track a subtask acknowledgment for an in-progress checkpoint.
    pub fn report_acknowledged(&self, id: u64, ack_timestamp: Timestamp) {
        if ack_timestamp < 0 {
            warn!(
                checkpoint_id = id,
                ack_timestamp, "Rejecting acknowledgment report with negative timestamp"
            );
            return;
        }

        let mut inner = self.inner.write();
        let Some(pending) = inner.in_progress.get_mut(&id) else {
            debug!(
                checkpoint_id = id,
                "Dropping acknowledgment for unknown or terminal checkpoint"
            );
            return;
        };

        pending.latest_ack_timestamp = pending.latest_ack_timestamp.max(ack_timestamp);
        pending.num_acknowledged_subtasks += 1;
        let updated = pending.clone();
        inner.history.replace(&updated);
    }

    /// Transition an in-progress checkpoint to completed.
    pub fn report_completed(
        &self,
        id: u64,
        state_size: i64,
        alignment_buffered: i64,
        external_path: Option<String>,
    ) {
        if state_size < 0 || alignment_buffered < 0 {
            warn!(
                checkpoint_id = id,
                state_size, alignment_buffered, "Rejecting completion report with negative byte counts"
            );
            return;
        }

        let mut inner = self.inner.write();
        let Some(mut record) = inner.in_progress.remove(&id) else {
            debug!(
                checkpoint_id = id,
                "Dropping completion report for unknown or terminal checkpoint"
            );
            return;
        };

        record.state_size = state_size;
        record.alignment_buffered = alignment_buffered;
        record.status = CheckpointStatsStatus::Completed {
            external_path,
            discarded: false,
        };

        inner.counts.increment_completed();
        inner.summary.observe(&record);
        inner.history.replace(&record);
        inner.history.update_latest(&record);
        debug!(checkpoint_id = id, state_size, "Tracking completed checkpoint");
    }

    /// Transition an in-progress checkpoint to failed.
    ///
    /// Failed attempts contribute no aggregate samples.
    pub fn report_failed(
        &self,
        id: u64,
        failure_timestamp: Timestamp,
        failure_message: Option<String>,
    ) {
        if failure_timestamp < 0 {
            warn!(
                checkpoint_id = id,
                failure_timestamp, "Rejecting failure report with negative timestamp"
            );
            return;
        }

        let mut inner = self.inner.write();
        let Some(mut record) = inner.in_progress.remove(&id) else {
            debug!(
                checkpoint_id = id,
                "Dropping failure report for unknown or terminal checkpoint"
            );
            return;
        };

        record.status = CheckpointStatsStatus::Failed {
            failure_timestamp,
            failure_message,
        };

        inner.counts.increment_failed();
        inner.history.replace(&record);
        inner.history.update_latest(&record);
        debug!(checkpoint_id = id, "Tracking failed checkpoint");
    }

    /// Mark a completed checkpoint's persisted data as released because a
    /// newer checkpoint superseded it.
    pub fn report_discarded(&self, id: u64) {
        let mut inner = self.inner.write();
        inner.history.mark_discarded(id);
        debug!(checkpoint_id = id, "Tracking discarded checkpoint");
    }

    /// Track the checkpoint the job resumed from. Last reporter wins.
    pub fn report_restored(
        &self,
        id: u64,
        restore_timestamp: Timestamp,
        properties: CheckpointProperties,
        external_path: Option<String>,
    ) {
        if restore_timestamp < 0 {
            warn!(
                checkpoint_id = id,
                restore_timestamp, "Rejecting restore report with negative timestamp"
            );
            return;
        }

        let mut inner = self.inner.write();
        inner.counts.increment_restored();
        inner.latest_restored = Some(RestoredCheckpointStats {
            checkpoint_id: id,
            restore_timestamp,
            properties,
            external_path,
        });
        debug!(checkpoint_id = id, "Tracking restored checkpoint");
    }

    /// Capture an immutable point-in-time copy of the tracker state.
    ///
    /// Linearizable with the report operations: a concurrent mutation is
    /// either fully reflected or not reflected at all.
    pub fn create_snapshot(&self) -> CheckpointStatsSnapshot {
        let inner = self.inner.read();
        CheckpointStatsSnapshot::new(
            inner.counts,
            inner.summary.clone(),
            inner.history.clone(),
            inner.latest_restored.clone(),
        )
    }
}
