//! Bounded history of recent checkpoint attempts.

use crate::record::{CheckpointStats, CheckpointStatsStatus};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Insertion-ordered ring of the most recent checkpoint records, plus
/// owning slots for the latest completed checkpoint, latest savepoint,
/// and latest failed checkpoint.
///
/// The three "latest" slots hold their own copies, so they stay valid
/// after the referenced record is evicted from the ring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointStatsHistory {
    capacity: usize,
    entries: VecDeque<CheckpointStats>,
    latest_completed_checkpoint: Option<CheckpointStats>,
    latest_savepoint: Option<CheckpointStats>,
    latest_failed_checkpoint: Option<CheckpointStats>,
}

impl CheckpointStatsHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            latest_completed_checkpoint: None,
            latest_savepoint: None,
            latest_failed_checkpoint: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in trigger order, oldest first.
    pub fn checkpoints(&self) -> impl Iterator<Item = &CheckpointStats> {
        self.entries.iter()
    }

    pub fn latest_completed_checkpoint(&self) -> Option<&CheckpointStats> {
        self.latest_completed_checkpoint.as_ref()
    }

    pub fn latest_savepoint(&self) -> Option<&CheckpointStats> {
        self.latest_savepoint.as_ref()
    }

    pub fn latest_failed_checkpoint(&self) -> Option<&CheckpointStats> {
        self.latest_failed_checkpoint.as_ref()
    }

    /// Append a freshly triggered record at the tail, evicting one entry
    /// first when the ring is full. Capacity 0 keeps no entries; the
    /// "latest" slots still work.
    pub fn add_in_progress(&mut self, record: CheckpointStats) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.evict_one();
        }
        self.entries.push_back(record);
    }

    /// Replace the in-ring entry carrying the same id, either with a
    /// refreshed in-progress copy (new acknowledgment) or with its
    /// terminal record.
    ///
    /// Returns false if the entry was already evicted; an evicted entry is
    /// not re-inserted, so the ring stays in trigger order.
    pub fn replace(&mut self, record: &CheckpointStats) -> bool {
        // Transitions and acks target recent entries; scan newest first.
        for entry in self.entries.iter_mut().rev() {
            if entry.id == record.id {
                *entry = record.clone();
                return true;
            }
        }
        false
    }

    /// Update the matching "latest" slot for a terminal record.
    pub fn update_latest(&mut self, record: &CheckpointStats) {
        match record.status {
            CheckpointStatsStatus::Completed { .. } => {
                if record.properties.is_savepoint() {
                    self.latest_savepoint = Some(record.clone());
                } else {
                    self.latest_completed_checkpoint = Some(record.clone());
                }
            }
            CheckpointStatsStatus::Failed { .. } => {
                self.latest_failed_checkpoint = Some(record.clone());
            }
            CheckpointStatsStatus::InProgress => {}
        }
    }

    /// Mark a completed entry's persisted data as released. Updates the
    /// ring entry and any "latest" slot holding the id.
    pub fn mark_discarded(&mut self, id: u64) {
        for entry in self.entries.iter_mut() {
            if entry.id == id {
                discard(entry);
            }
        }
        if let Some(record) = self.latest_completed_checkpoint.as_mut() {
            if record.id == id {
                discard(record);
            }
        }
        if let Some(record) = self.latest_savepoint.as_mut() {
            if record.id == id {
                discard(record);
            }
        }
    }

    /// Pick and remove one entry to make room.
    ///
    /// Preference order: the oldest failed or discarded entry not held by
    /// a "latest" slot, then the oldest entry not held by a "latest" slot,
    /// then the oldest entry. The most recent entry is only evicted when
    /// it is the sole entry (capacity 1).
    fn evict_one(&mut self) {
        if self.entries.len() <= 1 {
            self.entries.pop_front();
            return;
        }

        let pinned = [
            self.latest_completed_checkpoint.as_ref().map(|r| r.id),
            self.latest_savepoint.as_ref().map(|r| r.id),
            self.latest_failed_checkpoint.as_ref().map(|r| r.id),
        ];
        let is_pinned = |id: u64| pinned.iter().any(|p| *p == Some(id));
        let candidates = self.entries.len() - 1;

        let victim = self
            .entries
            .iter()
            .take(candidates)
            .position(|e| reclaim_first(e) && !is_pinned(e.id))
            .or_else(|| {
                self.entries
                    .iter()
                    .take(candidates)
                    .position(|e| !is_pinned(e.id))
            })
            .unwrap_or(0);

        self.entries.remove(victim);
    }
}

fn discard(entry: &mut CheckpointStats) {
    if let CheckpointStatsStatus::Completed { discarded, .. } = &mut entry.status {
        *discarded = true;
    }
}

/// Entries whose history slot is reclaimed ahead of others: failed
/// attempts and completed checkpoints whose data was already released.
fn reclaim_first(entry: &CheckpointStats) -> bool {
    match entry.status {
        CheckpointStatsStatus::Failed { .. } => true,
        CheckpointStatsStatus::Completed { discarded, .. } => discarded,
        CheckpointStatsStatus::InProgress => false,
    }
}
