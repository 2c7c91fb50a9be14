//! JetStream streams carrying workflow status messages.
//!
//! This module provides:
//!
//! - [`StatusStream`]: stream definitions (name, subject, retention)
//! - [`NatsStatusChannel`]: the [`StatusChannel`] implementation publishing to them
//!
//! [`StatusChannel`]: wfstatus_core::transport::StatusChannel

mod channel_config;
mod status_channel;
mod status_stream;

pub use channel_config::ChannelConfig;
pub use status_channel::{NatsStatusChannel, subject_for};
pub use status_stream::{JobsStatusStream, StatusStream, subject_matches};
