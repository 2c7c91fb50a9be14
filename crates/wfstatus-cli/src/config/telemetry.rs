//! Log output configuration.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

/// Format of the diagnostic log written to stderr.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines with ANSI colors.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Log output options.
///
/// The log level itself comes from `RUST_LOG`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Args)]
pub struct TelemetryConfig {
    /// Log output format.
    #[arg(long = "log-format", env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    #[serde(default)]
    pub log_format: LogFormat,
}
