//! Projection of a statistics snapshot into the dashboard report document.
//!
//! The field names and omission rules are a wire contract shared with the
//! dashboard and CLI: optional fields that do not exist for a record's
//! lifecycle state are omitted entirely, never emitted as null.

use crate::record::{CheckpointStats, CheckpointStatsStatus, RestoredCheckpointStats};
use crate::snapshot::CheckpointStatsSnapshot;
use crate::summary::MinMaxAvgStats;
use serde_json::{json, Value};

/// Render a snapshot as the report document.
///
/// Total over any snapshot the tracker can produce; rendering never fails.
pub fn render_snapshot(snapshot: &CheckpointStatsSnapshot) -> Value {
    let counts = snapshot.counts();
    let summary = snapshot.summary();
    let history = snapshot.history();

    let mut latest = serde_json::Map::new();
    if let Some(completed) = history.latest_completed_checkpoint() {
        latest.insert("completed".to_string(), checkpoint_view(completed));
    }
    if let Some(savepoint) = history.latest_savepoint() {
        latest.insert("savepoint".to_string(), checkpoint_view(savepoint));
    }
    if let Some(failed) = history.latest_failed_checkpoint() {
        latest.insert("failed".to_string(), failed_view(failed));
    }
    if let Some(restored) = snapshot.latest_restored() {
        latest.insert("restored".to_string(), restored_view(restored));
    }

    json!({
        "counts": {
            "restored": counts.restored(),
            "total": counts.total(),
            "in_progress": counts.in_progress(),
            "completed": counts.completed(),
            "failed": counts.failed(),
        },
        "summary": {
            "state_size": min_max_avg_view(summary.state_size()),
            "end_to_end_duration": min_max_avg_view(summary.end_to_end_duration()),
            "alignment_buffered": min_max_avg_view(summary.alignment_buffered()),
        },
        "latest": Value::Object(latest),
        "history": history.checkpoints().map(history_entry_view).collect::<Vec<_>>(),
    })
}

fn min_max_avg_view(stats: &MinMaxAvgStats) -> Value {
    json!({
        "min": stats.min(),
        "max": stats.max(),
        "avg": stats.average(),
    })
}

/// View of a completed checkpoint or savepoint in the `latest` section.
fn checkpoint_view(record: &CheckpointStats) -> Value {
    let mut view = json!({
        "id": record.id,
        "trigger_timestamp": record.trigger_timestamp,
        "latest_ack_timestamp": record.latest_ack_timestamp,
        "state_size": record.state_size,
        "end_to_end_duration": record.end_to_end_duration(),
        "alignment_buffered": record.alignment_buffered,
    });
    if let CheckpointStatsStatus::Completed {
        external_path: Some(path),
        ..
    } = &record.status
    {
        view["external_path"] = json!(path);
    }
    view
}

/// View of the latest failed checkpoint: no external path, plus the
/// failure fields.
fn failed_view(record: &CheckpointStats) -> Value {
    let mut view = json!({
        "id": record.id,
        "trigger_timestamp": record.trigger_timestamp,
        "latest_ack_timestamp": record.latest_ack_timestamp,
        "state_size": record.state_size,
        "end_to_end_duration": record.end_to_end_duration(),
        "alignment_buffered": record.alignment_buffered,
    });
    if let CheckpointStatsStatus::Failed {
        failure_timestamp,
        failure_message,
    } = &record.status
    {
        view["failure_timestamp"] = json!(failure_timestamp);
        if let Some(message) = failure_message {
            view["failure_message"] = json!(message);
        }
    }
    view
}

fn restored_view(record: &RestoredCheckpointStats) -> Value {
    let mut view = json!({
        "id": record.checkpoint_id,
        "restore_timestamp": record.restore_timestamp,
        "is_savepoint": record.properties.is_savepoint(),
    });
    if let Some(path) = &record.external_path {
        view["external_path"] = json!(path);
    }
    view
}

fn history_entry_view(record: &CheckpointStats) -> Value {
    let mut entry = json!({
        "id": record.id,
        "status": record.status.name(),
        "is_savepoint": record.properties.is_savepoint(),
        "trigger_timestamp": record.trigger_timestamp,
        "latest_ack_timestamp": record.latest_ack_timestamp,
        "state_size": record.state_size,
        "end_to_end_duration": record.end_to_end_duration(),
        "alignment_buffered": record.alignment_buffered,
        "num_subtasks": record.num_subtasks,
        "num_acknowledged_subtasks": record.num_acknowledged_subtasks,
    });
    match &record.status {
        CheckpointStatsStatus::InProgress => {}
        CheckpointStatsStatus::Completed {
            external_path,
            discarded,
        } => {
            if let Some(path) = external_path {
                entry["external_path"] = json!(path);
            }
            entry["discarded"] = json!(discarded);
        }
        CheckpointStatsStatus::Failed {
            failure_timestamp,
            failure_message,
        } => {
            entry["failure_timestamp"] = json!(failure_timestamp);
            if let Some(message) = failure_message {
                entry["failure_message"] = json!(message);
            }
        }
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckpointStatsConfig;
    use crate::tracker::CheckpointStatsTracker;
    use flywheel_core::CheckpointProperties;

    fn tracker() -> CheckpointStatsTracker {
        CheckpointStatsTracker::new(CheckpointStatsConfig::default())
    }

    #[test]
    fn test_fresh_tracker_renders_empty_sections() {
        let report = render_snapshot(&tracker().create_snapshot());

        assert_eq!(report["counts"]["total"], 0);
        assert_eq!(report["summary"]["state_size"]["min"], -1);
        assert_eq!(report["summary"]["state_size"]["avg"], -1);
        assert!(report["latest"].as_object().unwrap().is_empty());
        assert!(report["history"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_full_report_document() {
        let tracker = tracker();
        tracker.report_restored(9, 50, CheckpointProperties::savepoint(), Some("sp-9".into()));

        tracker.report_triggered(1, 100, CheckpointProperties::checkpoint(), 2);
        tracker.report_acknowledged(1, 150);
        tracker.report_acknowledged(1, 160);
        tracker.report_completed(1, 1000, 16, Some("chk-1".into()));

        tracker.report_triggered(2, 200, CheckpointProperties::savepoint(), 2);
        tracker.report_acknowledged(2, 260);
        tracker.report_acknowledged(2, 270);
        tracker.report_completed(2, 2000, 0, Some("sp-2".into()));

        tracker.report_triggered(3, 300, CheckpointProperties::checkpoint(), 2);
        tracker.report_acknowledged(3, 310);
        tracker.report_failed(3, 330, Some("subtask failure".into()));

        tracker.report_triggered(4, 400, CheckpointProperties::checkpoint(), 2);
        tracker.report_acknowledged(4, 420);

        let report = render_snapshot(&tracker.create_snapshot());

        let counts = &report["counts"];
        assert_eq!(counts["restored"], 1);
        assert_eq!(counts["total"], 4);
        assert_eq!(counts["in_progress"], 1);
        assert_eq!(counts["completed"], 2);
        assert_eq!(counts["failed"], 1);

        let state_size = &report["summary"]["state_size"];
        assert_eq!(state_size["min"], 1000);
        assert_eq!(state_size["max"], 2000);
        assert_eq!(state_size["avg"], 1500);
        let duration = &report["summary"]["end_to_end_duration"];
        assert_eq!(duration["min"], 60);
        assert_eq!(duration["max"], 70);

        let completed = &report["latest"]["completed"];
        assert_eq!(completed["id"], 1);
        assert_eq!(completed["trigger_timestamp"], 100);
        assert_eq!(completed["latest_ack_timestamp"], 160);
        assert_eq!(completed["state_size"], 1000);
        assert_eq!(completed["end_to_end_duration"], 60);
        assert_eq!(completed["alignment_buffered"], 16);
        assert_eq!(completed["external_path"], "chk-1");

        let savepoint = &report["latest"]["savepoint"];
        assert_eq!(savepoint["id"], 2);
        assert_eq!(savepoint["external_path"], "sp-2");

        let failed = &report["latest"]["failed"];
        assert_eq!(failed["id"], 3);
        assert_eq!(failed["failure_timestamp"], 330);
        assert_eq!(failed["failure_message"], "subtask failure");
        assert!(failed.get("external_path").is_none());

        let restored = &report["latest"]["restored"];
        assert_eq!(restored["id"], 9);
        assert_eq!(restored["restore_timestamp"], 50);
        assert_eq!(restored["is_savepoint"], true);
        assert_eq!(restored["external_path"], "sp-9");

        let history = report["history"].as_array().unwrap();
        assert_eq!(history.len(), 4);

        // Oldest first, trigger order.
        let first = &history[0];
        assert_eq!(first["id"], 1);
        assert_eq!(first["status"], "COMPLETED");
        assert_eq!(first["is_savepoint"], false);
        assert_eq!(first["num_subtasks"], 2);
        assert_eq!(first["num_acknowledged_subtasks"], 2);
        assert_eq!(first["discarded"], false);
        assert_eq!(first["external_path"], "chk-1");

        let third = &history[2];
        assert_eq!(third["status"], "FAILED");
        assert_eq!(third["failure_timestamp"], 330);
        assert_eq!(third["failure_message"], "subtask failure");
        assert!(third.get("discarded").is_none());

        let fourth = &history[3];
        assert_eq!(fourth["status"], "IN_PROGRESS");
        assert_eq!(fourth["latest_ack_timestamp"], 420);
        assert!(fourth.get("external_path").is_none());
        assert!(fourth.get("discarded").is_none());
        assert!(fourth.get("failure_timestamp").is_none());
    }

    #[test]
    fn test_external_path_omitted_when_absent() {
        let tracker = tracker();
        tracker.report_triggered(1, 100, CheckpointProperties::checkpoint(), 1);
        tracker.report_acknowledged(1, 150);
        tracker.report_completed(1, 10, 0, None);

        let report = render_snapshot(&tracker.create_snapshot());
        let completed = &report["latest"]["completed"];
        assert!(completed.get("external_path").is_none());
        let entry = &report["history"][0];
        assert!(entry.get("external_path").is_none());
        assert_eq!(entry["discarded"], false);
    }

    #[test]
    fn test_in_progress_entry_without_acks() {
        let tracker = tracker();
        tracker.report_triggered(1, 100, CheckpointProperties::checkpoint(), 4);

        let report = render_snapshot(&tracker.create_snapshot());
        let entry = &report["history"][0];
        assert_eq!(entry["status"], "IN_PROGRESS");
        assert_eq!(entry["latest_ack_timestamp"], -1);
        assert_eq!(entry["end_to_end_duration"], -1);
        assert_eq!(entry["state_size"], -1);
        assert_eq!(entry["num_acknowledged_subtasks"], 0);
    }

    #[test]
    fn test_equal_snapshots_render_identically() {
        let tracker = tracker();
        tracker.report_triggered(1, 100, CheckpointProperties::checkpoint(), 1);
        tracker.report_acknowledged(1, 130);
        tracker.report_completed(1, 64, 0, Some("p".into()));

        let a = render_snapshot(&tracker.create_snapshot());
        let b = render_snapshot(&tracker.create_snapshot());
        assert_eq!(a, b);
    }
}
