//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── tracker: TrackerConfig     # Workflow id, exchange, queue
//! ├── nats: NatsConfig           # Broker connection
//! ├── channel: ChannelConfig     # JetStream acknowledgments
//! ├── replay: ReplayConfig       # Snapshot files, log file, dry run
//! └── telemetry: TelemetryConfig # Log output format
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! wfstatus-cli --workflow-uuid abc-123 --nats-url nats://broker:4222 start.json done.json
//!
//! # Or via environment variables
//! WORKFLOW_UUID=abc-123 NATS_URL=nats://broker:4222 wfstatus-cli start.json done.json
//! ```

mod replay;
mod telemetry;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use replay::ReplayConfig;
use serde::{Deserialize, Serialize};
pub use telemetry::{LogFormat, TelemetryConfig};
use wfstatus_core::tracker::TrackerConfig;
use wfstatus_nats::stream::subject_for;
use wfstatus_nats::{ChannelConfig, JobsStatusStream, NatsConfig, StatusStream};

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "wfstatus")]
#[command(about = "Replays workflow snapshots to the jobs-status queue")]
#[command(version)]
pub struct Cli {
    /// Workflow identity and status destination.
    #[clap(flatten)]
    pub tracker: TrackerConfig,

    /// NATS connection configuration.
    #[clap(flatten)]
    pub nats: NatsConfig,

    /// JetStream delivery configuration.
    #[clap(flatten)]
    pub channel: ChannelConfig,

    /// Snapshot files and report options.
    #[clap(flatten)]
    pub replay: ReplayConfig,

    /// Log output configuration.
    #[clap(flatten)]
    pub telemetry: TelemetryConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its variables
    /// act as defaults for the `env` attributes.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    ///
    /// Broker settings are only checked when the run actually publishes.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.tracker
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid tracker configuration")?;
        self.replay
            .validate()
            .context("invalid replay configuration")?;

        if !self.replay.dry_run {
            self.nats
                .validate()
                .map_err(anyhow::Error::msg)
                .context("invalid NATS configuration")?;

            let subject = subject_for(&self.tracker.destination());
            if !JobsStatusStream::captures(&subject) {
                anyhow::bail!(
                    "subject '{subject}' is not stored by the {} stream",
                    JobsStatusStream::NAME
                );
            }
        }

        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            workflow_uuid = %self.tracker.workflow_uuid,
            status_exchange = %self.tracker.status_exchange,
            status_queue = %self.tracker.status_queue,
            snapshots = self.replay.snapshots.len(),
            log_file = ?self.replay.log_file,
            dry_run = self.replay.dry_run,
            "Replay configuration"
        );

        if self.replay.dry_run {
            return;
        }

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            nats_servers = ?self.nats.servers(),
            nats_client_name = %self.nats.name(),
            nats_authenticated = self.nats.nats_token.is_some(),
            await_ack = self.channel.await_ack,
            ack_timeout_secs = ?self.channel.ack_timeout_secs,
            "Broker configuration"
        );
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "dotenv").then_some("dotenv"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use wfstatus_core::transport::STATUS_QUEUE;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_minimal_dry_run() {
        let cli = Cli::try_parse_from([
            "wfstatus",
            "--workflow-uuid",
            "abc-123",
            "--dry-run",
            "start.json",
        ])
        .unwrap();

        assert_eq!(cli.tracker.workflow_uuid, "abc-123");
        assert_eq!(cli.tracker.status_queue, STATUS_QUEUE);
        assert!(cli.tracker.status_exchange.is_empty());
        assert!(cli.replay.dry_run);
        assert_eq!(cli.replay.snapshots.len(), 1);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn requires_at_least_one_snapshot() {
        let result = Cli::try_parse_from(["wfstatus", "--workflow-uuid", "abc-123"]);
        assert!(result.is_err());
    }

    #[test]
    fn ack_timeout_requires_await_ack() {
        let result = Cli::try_parse_from([
            "wfstatus",
            "--workflow-uuid",
            "abc-123",
            "--ack-timeout",
            "5",
            "start.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn dry_run_skips_broker_validation() {
        let mut cli = Cli::try_parse_from([
            "wfstatus",
            "--workflow-uuid",
            "abc-123",
            "--dry-run",
            "start.json",
        ])
        .unwrap();
        cli.nats.nats_url = "http://not-nats".to_owned();
        assert!(cli.validate().is_ok());

        cli.replay.dry_run = false;
        assert!(cli.validate().is_err());
    }

    #[test]
    fn publishing_requires_a_stored_subject() {
        let parse = |queue: &str| {
            Cli::try_parse_from([
                "wfstatus",
                "--workflow-uuid",
                "abc-123",
                "--status-queue",
                queue,
                "start.json",
            ])
            .unwrap()
        };

        assert!(parse("jobs-status").validate().is_ok());
        assert!(parse("status-updates").validate().is_err());

        let mut dry_run = parse("status-updates");
        dry_run.replay.dry_run = true;
        assert!(dry_run.validate().is_ok());
    }

    #[test]
    fn reports_only_declared_features() {
        let features = Cli::enabled_features();
        assert!(features.iter().all(|f| *f == "dotenv"));
        assert_eq!(features.contains(&"dotenv"), cfg!(feature = "dotenv"));
    }

    #[test]
    fn rejects_blank_workflow_uuid() {
        let cli = Cli::try_parse_from([
            "wfstatus",
            "--workflow-uuid",
            "  ",
            "--dry-run",
            "start.json",
        ])
        .unwrap();
        assert!(cli.validate().is_err());
    }
}
