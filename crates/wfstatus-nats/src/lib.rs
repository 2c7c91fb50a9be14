#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for NATS client operations.
///
/// Use this target for logging client initialization, configuration, and client-level errors.
pub const TRACING_TARGET_CLIENT: &str = "wfstatus_nats::client";

/// Tracing target for NATS JetStream operations.
///
/// Use this target for logging stream setup and status message delivery.
pub const TRACING_TARGET_STREAM: &str = "wfstatus_nats::stream";

/// Tracing target for NATS connection operations.
///
/// Use this target for logging connection establishment, reconnection, and connection errors.
pub const TRACING_TARGET_CONNECTION: &str = "wfstatus_nats::connection";

mod client;
mod error;
pub mod prelude;
pub mod stream;

// Re-export async_nats types needed by consumers
pub use async_nats::jetstream;
pub use client::{NatsClient, NatsConfig};
pub use error::{Error, Result};
pub use stream::{ChannelConfig, JobsStatusStream, NatsStatusChannel, StatusStream};
