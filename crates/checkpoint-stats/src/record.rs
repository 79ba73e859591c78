//! Per-attempt checkpoint statistics records.

use flywheel_core::{CheckpointProperties, Timestamp};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a tracked checkpoint attempt, carrying the fields
/// that only exist in that state.
///
/// A record moves `InProgress -> Completed` or `InProgress -> Failed`
/// exactly once and is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointStatsStatus {
    /// Triggered, not all subtasks have acknowledged yet.
    InProgress,
    /// All subtasks acknowledged and state was persisted.
    Completed {
        /// Durable-storage location of the checkpoint data.
        external_path: Option<String>,
        /// Set once a newer checkpoint superseded this one and its data
        /// was released.
        discarded: bool,
    },
    /// Aborted before completion.
    Failed {
        failure_timestamp: Timestamp,
        failure_message: Option<String>,
    },
}

impl CheckpointStatsStatus {
    /// Status name as it appears in the report document.
    pub fn name(&self) -> &'static str {
        match self {
            CheckpointStatsStatus::InProgress => "IN_PROGRESS",
            CheckpointStatsStatus::Completed { .. } => "COMPLETED",
            CheckpointStatsStatus::Failed { .. } => "FAILED",
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, CheckpointStatsStatus::InProgress)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, CheckpointStatsStatus::Completed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CheckpointStatsStatus::Failed { .. })
    }
}

/// Statistics for one checkpoint attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointStats {
    /// Monotonically increasing, unique per job.
    pub id: u64,
    pub trigger_timestamp: Timestamp,
    /// Timestamp of the most recent subtask acknowledgment, -1 before the
    /// first one arrives.
    pub latest_ack_timestamp: Timestamp,
    /// Persisted state size in bytes, -1 if unknown.
    pub state_size: i64,
    /// Bytes buffered during barrier alignment, 0 for unaligned
    /// checkpoints.
    pub alignment_buffered: i64,
    pub num_subtasks: u32,
    pub num_acknowledged_subtasks: u32,
    pub properties: CheckpointProperties,
    pub status: CheckpointStatsStatus,
}

impl CheckpointStats {
    /// Record for a freshly triggered checkpoint.
    pub fn new_in_progress(
        id: u64,
        trigger_timestamp: Timestamp,
        properties: CheckpointProperties,
        num_subtasks: u32,
    ) -> Self {
        Self {
            id,
            trigger_timestamp,
            latest_ack_timestamp: -1,
            state_size: -1,
            alignment_buffered: 0,
            num_subtasks,
            num_acknowledged_subtasks: 0,
            properties,
            status: CheckpointStatsStatus::InProgress,
        }
    }

    /// End-to-end duration in milliseconds, derived from the trigger and
    /// latest acknowledgment timestamps. -1 until the first
    /// acknowledgment arrives.
    pub fn end_to_end_duration(&self) -> i64 {
        if self.latest_ack_timestamp < 0 {
            -1
        } else {
            (self.latest_ack_timestamp - self.trigger_timestamp).max(0)
        }
    }
}

/// The checkpoint a job most recently resumed from.
///
/// Independent of the history ring; may reference an id older than
/// anything still retained there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoredCheckpointStats {
    pub checkpoint_id: u64,
    pub restore_timestamp: Timestamp,
    pub properties: CheckpointProperties,
    pub external_path: Option<String>,
}
