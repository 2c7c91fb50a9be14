//! Replays snapshot files through the tracker lifecycle.

mod stdout;

use std::path::Path;

use anyhow::Context;
use serde_json::Value;
pub use stdout::StdoutChannel;
use wfstatus_core::LifecycleOperation;
use wfstatus_core::envelope::StatusNote;
use wfstatus_core::tracker::StatusTracker;
use wfstatus_core::transport::{Delivery, StatusChannel};

use crate::TRACING_TARGET_REPLAY;
use crate::config::ReplayConfig;

/// Outcome of a completed replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Envelopes published.
    pub reports: usize,
    /// Envelopes confirmed by the broker.
    pub acknowledged: usize,
}

impl ReplaySummary {
    fn record(&mut self, delivery: &Delivery) {
        self.reports += 1;
        if delivery.is_acked() {
            self.acknowledged += 1;
        }
    }
}

/// Assigns a lifecycle call to each of `count` snapshot files.
///
/// The first file initializes and the last one finalizes; a single file is
/// used for both calls.
pub fn plan(count: usize) -> Vec<(usize, LifecycleOperation)> {
    match count {
        0 => Vec::new(),
        1 => vec![
            (0, LifecycleOperation::Initialize),
            (0, LifecycleOperation::Finalize),
        ],
        n => std::iter::once((0, LifecycleOperation::Initialize))
            .chain((1..n - 1).map(|i| (i, LifecycleOperation::Track)))
            .chain(std::iter::once((n - 1, LifecycleOperation::Finalize)))
            .collect(),
    }
}

/// Replays the configured snapshots through `tracker`.
///
/// Stops at the first failing call; the tracker is left in the state that
/// call produced.
pub async fn run<C>(
    tracker: &mut StatusTracker<C>,
    config: &ReplayConfig,
) -> anyhow::Result<ReplaySummary>
where
    C: StatusChannel,
{
    let mut summary = ReplaySummary::default();

    for (index, operation) in plan(config.snapshots.len()) {
        let path = &config.snapshots[index];
        let snapshot = read_snapshot(path).await?;
        let note = read_note(config).await?;

        tracing::debug!(
            target: TRACING_TARGET_REPLAY,
            path = %path.display(),
            operation = %operation,
            "replaying snapshot"
        );

        let delivery = match operation {
            LifecycleOperation::Initialize => tracker.initialize_with(&snapshot, note).await,
            LifecycleOperation::Track => tracker.track_with(&snapshot, note).await,
            LifecycleOperation::Finalize => tracker.finalize_with(&snapshot, note).await,
        }
        .with_context(|| format!("{operation} failed for {}", path.display()))?;

        summary.record(&delivery);
    }

    Ok(summary)
}

async fn read_snapshot(path: &Path) -> anyhow::Result<Value> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;

    serde_json::from_slice(&bytes)
        .with_context(|| format!("snapshot {} is not valid JSON", path.display()))
}

async fn read_note(config: &ReplayConfig) -> anyhow::Result<StatusNote> {
    let mut note = StatusNote::new();

    if let Some(path) = &config.log_file {
        let logs = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read log file {}", path.display()))?;
        note = note.with_logs(logs);
    }

    if let Some(message) = &config.message {
        note = note.with_message(message);
    }

    Ok(note)
}
