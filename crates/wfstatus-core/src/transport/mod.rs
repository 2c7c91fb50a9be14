//! Delivery of status envelopes to the status queue.
//!
//! The broker connection belongs to the caller. This module only needs a
//! [`StatusChannel`]: something that can take an [`OutboundMessage`] and
//! report how it was delivered. [`publish`] is the single operation that
//! encodes an envelope and hands it to a channel.

mod error;

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use error::TransportError;

use crate::TRACING_TARGET_TRANSPORT;
use crate::envelope::StatusEnvelope;

/// Queue that receives workflow status messages.
pub const STATUS_QUEUE: &str = "jobs-status";

/// Name of the broker's default exchange.
pub const DEFAULT_EXCHANGE: &str = "";

/// Exchange and routing key a message is sent to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    /// Exchange name; empty for the default exchange.
    pub exchange: String,
    /// Routing key; the queue name on the default exchange.
    pub routing_key: String,
}

impl Destination {
    /// Creates a destination.
    pub fn new(exchange: impl Into<String>, routing_key: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            routing_key: routing_key.into(),
        }
    }

    /// A queue reached through the default exchange.
    pub fn queue(name: impl Into<String>) -> Self {
        Self::new(DEFAULT_EXCHANGE, name)
    }

    /// Returns true if this targets the default exchange.
    #[inline]
    pub fn is_default_exchange(&self) -> bool {
        self.exchange.is_empty()
    }
}

impl Default for Destination {
    fn default() -> Self {
        Self::queue(STATUS_QUEUE)
    }
}

/// An encoded envelope ready for a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    destination: Destination,
    message_id: String,
    payload: Bytes,
    persistent: bool,
}

impl OutboundMessage {
    /// Creates a persistent message with a fresh id.
    pub fn persistent(destination: Destination, payload: Bytes) -> Self {
        Self {
            destination,
            message_id: Uuid::now_v7().to_string(),
            payload,
            persistent: true,
        }
    }

    /// Creates a message the broker may drop on restart.
    pub fn transient(destination: Destination, payload: Bytes) -> Self {
        Self {
            persistent: false,
            ..Self::persistent(destination, payload)
        }
    }

    /// Where the message goes.
    #[inline]
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Unique id, usable by brokers for de-duplication.
    #[inline]
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Encoded message body.
    #[inline]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Whether the broker must keep the message across restarts.
    #[inline]
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }
}

/// How far a message got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the transport; no confirmation was awaited.
    Sent,
    /// Stored and confirmed by the broker.
    Acked {
        /// Stream or queue that stored the message.
        stream: String,
        /// Broker-assigned sequence number.
        sequence: u64,
        /// The broker had already seen this message id.
        duplicate: bool,
    },
}

impl Delivery {
    /// Returns true if the broker confirmed the message.
    #[inline]
    pub const fn is_acked(&self) -> bool {
        matches!(self, Self::Acked { .. })
    }
}

/// A caller-owned handle to an open broker channel.
///
/// Implementations only write; they never close or reconfigure the
/// underlying connection.
#[async_trait::async_trait]
pub trait StatusChannel: Send + Sync {
    /// Sends one message.
    async fn send(&self, message: OutboundMessage) -> Result<Delivery, TransportError>;
}

#[async_trait::async_trait]
impl<C: StatusChannel + ?Sized> StatusChannel for Arc<C> {
    async fn send(&self, message: OutboundMessage) -> Result<Delivery, TransportError> {
        (**self).send(message).await
    }
}

#[async_trait::async_trait]
impl<'a, C: StatusChannel + ?Sized> StatusChannel for &'a C {
    async fn send(&self, message: OutboundMessage) -> Result<Delivery, TransportError> {
        (**self).send(message).await
    }
}

/// Encodes `envelope` as compact JSON and publishes it persistently to the
/// `jobs-status` queue on the default exchange.
pub async fn publish<C>(channel: &C, envelope: &StatusEnvelope) -> Result<Delivery, TransportError>
where
    C: StatusChannel + ?Sized,
{
    publish_to(channel, &Destination::default(), envelope).await
}

/// Like [`publish`], with an explicit destination.
#[tracing::instrument(
    skip(channel, envelope),
    target = TRACING_TARGET_TRANSPORT,
    fields(workflow_uuid = %envelope.workflow_uuid(), status = envelope.status().as_u8())
)]
pub async fn publish_to<C>(
    channel: &C,
    destination: &Destination,
    envelope: &StatusEnvelope,
) -> Result<Delivery, TransportError>
where
    C: StatusChannel + ?Sized,
{
    let payload = serde_json::to_vec(envelope)?;
    let payload_size = payload.len();
    let message = OutboundMessage::persistent(destination.clone(), Bytes::from(payload));
    let message_id = message.message_id().to_owned();

    let delivery = channel.send(message).await.inspect_err(|error| {
        tracing::warn!(
            target: TRACING_TARGET_TRANSPORT,
            routing_key = %destination.routing_key,
            error = %error,
            "status publish failed"
        );
    })?;

    tracing::debug!(
        target: TRACING_TARGET_TRANSPORT,
        exchange = %destination.exchange,
        routing_key = %destination.routing_key,
        message_id = %message_id,
        payload_size = payload_size,
        acked = delivery.is_acked(),
        "published status envelope"
    );

    Ok(delivery)
}
