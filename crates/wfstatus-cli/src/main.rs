#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod replay;
mod telemetry;

use std::process;

use anyhow::Context;
use wfstatus_core::tracker::StatusTracker;
use wfstatus_nats::NatsClient;

use crate::config::Cli;
use crate::replay::StdoutChannel;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "wfstatus_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "wfstatus_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "wfstatus_cli::config";
pub const TRACING_TARGET_REPLAY: &str = "wfstatus_cli::replay";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing(&cli.telemetry)?;
    cli.log();
    cli.validate()?;

    let summary = if cli.replay.dry_run {
        let mut tracker = StatusTracker::from_config(&cli.tracker, StdoutChannel::stdout());
        replay::run(&mut tracker, &cli.replay).await?
    } else {
        let client = NatsClient::connect(cli.nats.clone())
            .await
            .context("failed to connect to NATS")?;
        let channel = client
            .jobs_status_channel(cli.channel.clone())
            .await
            .context("failed to open the status channel")?;

        let mut tracker = StatusTracker::from_config(&cli.tracker, channel);
        replay::run(&mut tracker, &cli.replay).await?
    };

    tracing::info!(
        target: TRACING_TARGET_SHUTDOWN,
        workflow_uuid = %cli.tracker.workflow_uuid,
        reports = summary.reports,
        acknowledged = summary.acknowledged,
        "snapshot replay complete"
    );

    Ok(())
}
