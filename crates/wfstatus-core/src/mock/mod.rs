//! In-memory channel for testing.
//!
//! [`MockChannel`] records every message it is given and can be told to fail
//! upcoming sends or to behave as a closed channel.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! wfstatus-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use wfstatus_core::mock::MockChannel;
//!
//! let channel = MockChannel::new();
//! let mut tracker = StatusTracker::new("abc-123", channel.clone());
//! tracker.track(&snapshot).await?;
//! assert_eq!(channel.envelopes().len(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::envelope::StatusEnvelope;
use crate::transport::{Delivery, OutboundMessage, StatusChannel, TransportError};

#[derive(Debug, Default)]
struct MockState {
    messages: Vec<OutboundMessage>,
    failures: VecDeque<TransportError>,
    closed: bool,
    acknowledge: bool,
    attempts: usize,
}

/// Recording channel with injectable failures.
///
/// Clones share the same recorded state.
#[derive(Debug, Clone, Default)]
pub struct MockChannel {
    state: Arc<Mutex<MockState>>,
}

impl MockChannel {
    /// Creates a channel that accepts everything without confirmation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a channel that confirms every message with a sequence number.
    pub fn acknowledging() -> Self {
        let channel = Self::default();
        channel.lock().acknowledge = true;
        channel
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the recorded messages.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes the next send fail with `error`.
    ///
    /// Queued failures are consumed in order.
    pub fn fail_next(&self, error: TransportError) {
        self.lock().failures.push_back(error);
    }

    /// Makes every following send fail with [`TransportError::ChannelClosed`].
    pub fn close(&self) {
        self.lock().closed = true;
    }

    /// Messages accepted so far.
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.lock().messages.clone()
    }

    /// Accepted messages decoded as envelopes.
    ///
    /// # Panics
    ///
    /// Panics if a payload is not a valid envelope.
    pub fn envelopes(&self) -> Vec<StatusEnvelope> {
        self.lock()
            .messages
            .iter()
            .map(|message| {
                serde_json::from_slice(message.payload()).expect("payload is not an envelope")
            })
            .collect()
    }

    /// Number of sends attempted, including failed ones.
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }
}

#[async_trait::async_trait]
impl StatusChannel for MockChannel {
    async fn send(&self, message: OutboundMessage) -> Result<Delivery, TransportError> {
        let mut state = self.lock();
        state.attempts += 1;

        if state.closed {
            return Err(TransportError::channel_closed("mock channel closed"));
        }
        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }

        let routing_key = message.destination().routing_key.clone();
        state.messages.push(message);

        if state.acknowledge {
            Ok(Delivery::Acked {
                stream: routing_key,
                sequence: state.messages.len() as u64,
                duplicate: false,
            })
        } else {
            Ok(Delivery::Sent)
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::transport::Destination;

    fn message() -> OutboundMessage {
        OutboundMessage::persistent(Destination::default(), Bytes::from_static(b"{}"))
    }

    #[tokio::test]
    async fn test_records_messages() {
        let channel = MockChannel::new();
        assert_eq!(channel.send(message()).await, Ok(Delivery::Sent));
        assert_eq!(channel.clone().messages().len(), 1);
    }

    #[tokio::test]
    async fn test_acknowledging_channel() {
        let channel = MockChannel::acknowledging();
        channel.send(message()).await.unwrap();
        let delivery = channel.send(message()).await.unwrap();

        assert_eq!(
            delivery,
            Delivery::Acked {
                stream: "jobs-status".into(),
                sequence: 2,
                duplicate: false
            }
        );
    }

    #[tokio::test]
    async fn test_failures_are_consumed_in_order() {
        let channel = MockChannel::new();
        channel.fail_next(TransportError::rejected("jobs-status", "first"));
        channel.fail_next(TransportError::channel_closed("second"));

        assert!(matches!(
            channel.send(message()).await,
            Err(TransportError::Rejected { .. })
        ));
        assert!(matches!(
            channel.send(message()).await,
            Err(TransportError::ChannelClosed { .. })
        ));
        assert!(channel.send(message()).await.is_ok());
        assert_eq!(channel.attempts(), 3);
        assert_eq!(channel.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_closed_channel() {
        let channel = MockChannel::new();
        channel.close();

        let error = channel.send(message()).await.unwrap_err();
        assert!(error.is_channel_closed());
        assert!(channel.messages().is_empty());
    }
}
