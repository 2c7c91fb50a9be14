//! Transport error type.

use std::time::Duration;

/// Failure to hand an envelope to the broker.
///
/// Channels return these as-is and the tracker passes them on untouched,
/// so a caller sees exactly what the channel reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The channel is closed or the connection is gone.
    #[error("Channel closed: {reason}")]
    ChannelClosed { reason: String },

    /// The broker refused the message.
    #[error("Publish to '{routing_key}' rejected: {reason}")]
    Rejected { routing_key: String, reason: String },

    /// The broker did not confirm the message in time.
    #[error("Publish confirmation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The envelope could not be encoded.
    #[error("Failed to encode envelope: {reason}")]
    Encode { reason: String },
}

impl TransportError {
    /// Create a channel closed error
    pub fn channel_closed(reason: impl Into<String>) -> Self {
        Self::ChannelClosed {
            reason: reason.into(),
        }
    }

    /// Create a rejected publish error
    pub fn rejected(routing_key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            routing_key: routing_key.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error with the given duration
    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout { timeout }
    }

    /// Returns true if the channel can no longer be used.
    #[inline]
    pub const fn is_channel_closed(&self) -> bool {
        matches!(self, Self::ChannelClosed { .. })
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(error: serde_json::Error) -> Self {
        Self::Encode {
            reason: error.to_string(),
        }
    }
}
