//! Demo driver for checkpoint statistics reporting.
//!
//! Feeds a synthetic checkpoint lifecycle stream into a stats tracker and
//! prints the projected report, the way the dashboard or CLI would consume
//! it.

use anyhow::Result;
use clap::Parser;
use flywheel_checkpoint_stats::{report, CheckpointStatsConfig, CheckpointStatsTracker};
use flywheel_core::CheckpointProperties;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "flywheel-demo")]
struct Args {
    /// Number of checkpoint attempts to simulate.
    #[arg(long, default_value = "8")]
    checkpoints: u64,

    /// Parallel subtasks acknowledging each checkpoint.
    #[arg(long, default_value = "4")]
    subtasks: u32,

    /// History ring capacity.
    #[arg(long, default_value = "16")]
    history: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let args = Args::parse();
    info!(
        checkpoints = args.checkpoints,
        subtasks = args.subtasks,
        "Simulating checkpoint lifecycle"
    );

    let tracker = CheckpointStatsTracker::new(CheckpointStatsConfig {
        num_remembered_checkpoints: args.history,
    });

    // The job starts from a savepoint.
    tracker.report_restored(
        0,
        1_700_000_000_000,
        CheckpointProperties::savepoint(),
        Some("s3://checkpoints/sp-0".to_string()),
    );

    let mut now: i64 = 1_700_000_000_500;
    for id in 1..=args.checkpoints {
        let properties = if id % 5 == 0 {
            CheckpointProperties::savepoint()
        } else {
            CheckpointProperties::checkpoint()
        };
        tracker.report_triggered(id, now, properties, args.subtasks);

        for _ in 0..args.subtasks {
            now += 7 + (id as i64 % 13);
            tracker.report_acknowledged(id, now);
        }

        if id % 7 == 0 {
            tracker.report_failed(id, now + 3, Some("subtask lost connection".to_string()));
        } else {
            let state_size = 50_000 + (id as i64) * 1_024;
            let alignment_buffered = (id as i64 % 3) * 256;
            tracker.report_completed(
                id,
                state_size,
                alignment_buffered,
                Some(format!("s3://checkpoints/chk-{id}")),
            );
        }
        // Periodic checkpoints are subsumed by their successor; savepoints
        // are retained.
        if id > 1 && (id - 1) % 5 != 0 {
            tracker.report_discarded(id - 1);
        }
        now += 250;
    }

    let snapshot = tracker.create_snapshot();
    println!(
        "{}",
        serde_json::to_string_pretty(&report::render_snapshot(&snapshot))?
    );
    Ok(())
}
