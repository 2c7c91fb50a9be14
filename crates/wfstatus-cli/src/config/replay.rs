//! Snapshot replay configuration.

use std::path::PathBuf;

use clap::Args;
use serde::{Deserialize, Serialize};

/// Snapshot files and per-report options.
#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct ReplayConfig {
    /// Snapshot JSON files, replayed in order.
    ///
    /// The first file initializes the tracker and the last one finalizes it.
    #[arg(required = true, value_name = "SNAPSHOT")]
    pub snapshots: Vec<PathBuf>,

    /// Log file whose contents are sent in the `logs` field of progress reports.
    ///
    /// Re-read before every report so a growing log is picked up.
    #[arg(long = "log-file", env = "STATUS_LOG_FILE")]
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Message sent instead of the timestamped placeholder.
    #[arg(long = "message", env = "STATUS_MESSAGE")]
    #[serde(default)]
    pub message: Option<String>,

    /// Print envelopes to stdout instead of publishing them.
    #[arg(long = "dry-run")]
    #[serde(default)]
    pub dry_run: bool,
}

impl ReplayConfig {
    /// Validates the replay configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.snapshots.is_empty() {
            anyhow::bail!("At least one snapshot file is required");
        }

        if self.message.as_deref().is_some_and(|m| m.trim().is_empty()) {
            anyhow::bail!("Message cannot be blank when provided");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(snapshots: &[&str]) -> ReplayConfig {
        ReplayConfig {
            snapshots: snapshots.iter().map(PathBuf::from).collect(),
            log_file: None,
            message: None,
            dry_run: false,
        }
    }

    #[test]
    fn validation_works_correctly() {
        assert!(config(&["a.json"]).validate().is_ok());
        assert!(config(&[]).validate().is_err());

        let mut blank_message = config(&["a.json"]);
        blank_message.message = Some(" ".to_owned());
        assert!(blank_message.validate().is_err());
    }
}
