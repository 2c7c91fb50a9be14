//! JetStream-backed status channel.

use std::future::IntoFuture;
use std::marker::PhantomData;

use async_nats::jetstream::{self, stream};
use async_nats::{Client, HeaderMap};
use tokio::time::timeout;
use tracing::{debug, instrument};
use wfstatus_core::TransportError;
use wfstatus_core::transport::{Delivery, Destination, OutboundMessage, StatusChannel};

use super::channel_config::ChannelConfig;
use super::status_stream::{JobsStatusStream, StatusStream};
use crate::{Error, Result, TRACING_TARGET_STREAM};

/// Maps an exchange and routing key onto a NATS subject.
///
/// The default exchange publishes straight to the routing key; a named
/// exchange `x` prefixes it as `x.<routing key>`.
pub fn subject_for(destination: &Destination) -> String {
    if destination.is_default_exchange() {
        destination.routing_key.clone()
    } else {
        format!("{}.{}", destination.exchange, destination.routing_key)
    }
}

/// Status channel publishing to the JetStream stream `S`.
///
/// Persistent messages are stored by JetStream (file storage) and carry their
/// message id in the `Nats-Msg-Id` header so the server drops duplicates.
/// Non-persistent messages use a plain core NATS publish.
#[derive(Debug, Clone)]
pub struct NatsStatusChannel<S = JobsStatusStream>
where
    S: StatusStream,
{
    client: Client,
    jetstream: jetstream::Context,
    config: ChannelConfig,
    _stream: PhantomData<S>,
}

impl<S> NatsStatusChannel<S>
where
    S: StatusStream,
{
    /// Create a new status channel, creating the stream if it is missing.
    #[instrument(skip(client, jetstream), target = TRACING_TARGET_STREAM)]
    pub(crate) async fn new(
        client: Client,
        jetstream: &jetstream::Context,
        config: ChannelConfig,
    ) -> Result<Self> {
        ensure_stream::<S>(jetstream).await?;

        Ok(Self {
            client,
            jetstream: jetstream.clone(),
            config,
            _stream: PhantomData,
        })
    }

    /// Returns the stream name.
    #[inline]
    pub fn stream_name(&self) -> &'static str {
        S::NAME
    }

    /// Returns the delivery settings.
    #[inline]
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    async fn publish_persistent(&self, subject: &str, message: &OutboundMessage) -> Result<Delivery> {
        let mut headers = HeaderMap::new();
        headers.insert(async_nats::header::NATS_MESSAGE_ID, message.message_id());
        headers.insert("Content-Type", "application/json");

        let ack = self
            .jetstream
            .publish_with_headers(subject.to_owned(), headers, message.payload().clone())
            .await
            .map_err(|e| Error::delivery_failed(subject, e.to_string()))?;

        if !self.config.await_ack {
            return Ok(Delivery::Sent);
        }

        let ack = match self.config.ack_timeout() {
            Some(limit) => timeout(limit, ack.into_future())
                .await
                .map_err(|_| Error::timeout(limit))?,
            None => ack.await,
        }
        .map_err(|e| Error::delivery_failed(subject, e.to_string()))?;

        Ok(Delivery::Acked {
            stream: ack.stream,
            sequence: ack.sequence,
            duplicate: ack.duplicate,
        })
    }

    async fn publish_transient(&self, subject: &str, message: &OutboundMessage) -> Result<Delivery> {
        self.client
            .publish(subject.to_owned(), message.payload().clone())
            .await
            .map_err(|e| Error::delivery_failed(subject, e.to_string()))?;

        Ok(Delivery::Sent)
    }
}

#[async_trait::async_trait]
impl<S> StatusChannel for NatsStatusChannel<S>
where
    S: StatusStream,
{
    #[instrument(skip(self, message), target = TRACING_TARGET_STREAM)]
    async fn send(&self, message: OutboundMessage) -> Result<Delivery, TransportError> {
        if matches!(
            self.client.connection_state(),
            async_nats::connection::State::Disconnected
        ) {
            return Err(TransportError::channel_closed(
                "NATS connection is disconnected",
            ));
        }

        let subject = subject_for(message.destination());
        if message.is_persistent() && !S::captures(&subject) {
            return Err(TransportError::rejected(
                subject,
                format!("not captured by stream {}", S::NAME),
            ));
        }

        let delivery = if message.is_persistent() {
            self.publish_persistent(&subject, &message).await?
        } else {
            self.publish_transient(&subject, &message).await?
        };

        debug!(
            target: TRACING_TARGET_STREAM,
            subject = %subject,
            stream = S::NAME,
            message_id = %message.message_id(),
            payload_size = message.payload().len(),
            delivery = ?delivery,
            "published status message"
        );
        Ok(delivery)
    }
}

/// Looks up the stream `S` and creates it with file storage when missing.
async fn ensure_stream<S>(jetstream: &jetstream::Context) -> Result<()>
where
    S: StatusStream,
{
    match jetstream.get_stream(S::NAME).await {
        Ok(_) => {
            debug!(
                target: TRACING_TARGET_STREAM,
                stream = S::NAME,
                "Using existing stream"
            );
        }
        Err(_) => {
            let stream_config = stream::Config {
                name: S::NAME.to_string(),
                description: Some(format!("Workflow status stream: {}", S::SUBJECT)),
                subjects: S::subjects(),
                storage: stream::StorageType::File,
                max_age: S::MAX_AGE.unwrap_or_default(),
                ..Default::default()
            };

            debug!(
                target: TRACING_TARGET_STREAM,
                stream = S::NAME,
                subjects = ?stream_config.subjects,
                max_age_secs = stream_config.max_age.as_secs(),
                "Creating new stream"
            );
            jetstream
                .create_stream(stream_config)
                .await
                .map_err(|e| Error::stream_error(S::NAME, e.to_string()))?;
        }
    }

    Ok(())
}
