//! Prelude module for wfstatus-nats.
//!
//! This module re-exports the most commonly used types from wfstatus-nats,
//! making it easy to import everything you need with a single `use` statement.
//!
//! # Example
//!
//! ```rust,ignore
//! use wfstatus_nats::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let client = NatsClient::connect(NatsConfig::new("nats://localhost:4222")).await?;
//! let channel = client.jobs_status_channel(ChannelConfig::default()).await?;
//! # Ok(())
//! # }
//! ```

// Client types
pub use crate::client::{NatsClient, NatsConfig};
// Stream types
pub use crate::stream::{ChannelConfig, JobsStatusStream, NatsStatusChannel, StatusStream};
// Error types
pub use crate::{Error, Result};
