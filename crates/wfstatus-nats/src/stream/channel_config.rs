//! Status channel configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Delivery settings of a [`NatsStatusChannel`].
///
/// [`NatsStatusChannel`]: super::NatsStatusChannel
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ChannelConfig {
    /// Wait for the JetStream acknowledgment of every status message
    #[cfg_attr(feature = "config", arg(long = "await-ack", env = "STATUS_AWAIT_ACK"))]
    #[serde(default)]
    pub await_ack: bool,

    /// Acknowledgment timeout in seconds (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "ack-timeout", env = "STATUS_ACK_TIMEOUT_SECS", requires = "await_ack")
    )]
    #[serde(default)]
    pub ack_timeout_secs: Option<u64>,
}

impl ChannelConfig {
    /// Fire-and-forget delivery.
    pub fn fire_and_forget() -> Self {
        Self::default()
    }

    /// Await the broker acknowledgment of every message.
    pub fn confirmed() -> Self {
        Self {
            await_ack: true,
            ack_timeout_secs: None,
        }
    }

    /// Set the acknowledgment timeout in seconds.
    #[must_use]
    pub fn with_ack_timeout_secs(mut self, secs: u64) -> Self {
        self.ack_timeout_secs = Some(secs);
        self
    }

    /// Returns the acknowledgment timeout as a Duration, if set.
    #[inline]
    pub fn ack_timeout(&self) -> Option<Duration> {
        self.ack_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fire_and_forget() {
        let config = ChannelConfig::default();
        assert_eq!(config, ChannelConfig::fire_and_forget());
        assert!(!config.await_ack);
        assert_eq!(config.ack_timeout(), None);
    }

    #[test]
    fn test_confirmed_with_timeout() {
        let config = ChannelConfig::confirmed().with_ack_timeout_secs(5);
        assert!(config.await_ack);
        assert_eq!(config.ack_timeout(), Some(Duration::from_secs(5)));
    }
}
