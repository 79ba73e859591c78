//! Core types shared across the engine.

use serde::{Deserialize, Serialize};

/// Milliseconds since Unix epoch; -1 where a timestamp has not been
/// observed yet.
pub type Timestamp = i64;

/// Whether an attempt is a periodic checkpoint or an explicitly requested
/// savepoint retained for manual restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointKind {
    Checkpoint,
    Savepoint,
}

/// Flags describing how a checkpoint attempt was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointProperties {
    pub kind: CheckpointKind,
    /// Requested outside the periodic schedule (manual trigger, shutdown).
    pub forced: bool,
}

impl CheckpointProperties {
    /// Properties of a regular periodic checkpoint.
    pub fn checkpoint() -> Self {
        Self {
            kind: CheckpointKind::Checkpoint,
            forced: false,
        }
    }

    /// Properties of a regular savepoint.
    pub fn savepoint() -> Self {
        Self {
            kind: CheckpointKind::Savepoint,
            forced: false,
        }
    }

    /// Properties of a forced attempt of the given kind.
    pub fn forced(kind: CheckpointKind) -> Self {
        Self { kind, forced: true }
    }

    pub fn is_savepoint(&self) -> bool {
        matches!(self.kind, CheckpointKind::Savepoint)
    }
}
