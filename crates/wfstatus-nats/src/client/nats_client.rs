//! NATS client wrapper and connection management.
//!
//! The `NatsClient` uses the underlying `async-nats` client, which multiplexes
//! all traffic over a single TCP connection:
//!
//! - **Thread-safe and Clone-able**: the `Client` is `Arc`-wrapped internally,
//!   so `clone()` shares the connection instead of opening a new one
//! - **Automatic reconnection**: exponential backoff capped at 30 seconds
//!
//! The connection is owned by whoever created the client. Status channels
//! built from it only publish; they never close or reconfigure it.
//!
//! ```ignore
//! let client = NatsClient::connect(config).await?;
//! let channel = client.jobs_status_channel(ChannelConfig::default()).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_nats::{Client, ConnectOptions, jetstream};
use tokio::time::timeout;

use super::nats_config::NatsConfig;
use crate::stream::{ChannelConfig, JobsStatusStream, NatsStatusChannel, StatusStream};
use crate::{Error, Result, TRACING_TARGET_CLIENT, TRACING_TARGET_CONNECTION};

/// NATS client wrapper with connection management.
///
/// This wrapper is cheaply cloneable and thread-safe.
#[derive(Debug, Clone)]
pub struct NatsClient {
    inner: Arc<NatsClientInner>,
}

/// Inner data for NATS client
#[derive(Debug)]
struct NatsClientInner {
    client: Client,
    jetstream: jetstream::Context,
    config: NatsConfig,
}

impl NatsClient {
    /// Create a new NATS client and connect
    #[tracing::instrument(skip(config), target = TRACING_TARGET_CONNECTION)]
    pub async fn connect(config: NatsConfig) -> Result<Self> {
        config.validate().map_err(Error::invalid_config)?;

        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            servers = ?config.servers(),
            name = %config.name(),
            "connecting to NATS servers"
        );

        let mut connect_opts = ConnectOptions::new()
            .name(config.name())
            .ping_interval(config.ping_interval())
            .connection_timeout(config.connect_timeout());

        if let Some(token) = config.nats_token.clone() {
            connect_opts = connect_opts.token(token);
        }

        if let Some(max_reconnects) = config.max_reconnects_option() {
            connect_opts = connect_opts.max_reconnects(max_reconnects);
        }

        let backoff = config.clone();
        connect_opts =
            connect_opts.reconnect_delay_callback(move |attempts| backoff.reconnect_delay(attempts));

        let connect_timeout = config.connect_timeout();
        let client = timeout(
            connect_timeout,
            async_nats::connect_with_options(config.nats_url.as_str(), connect_opts),
        )
        .await
        .map_err(|_| Error::timeout(connect_timeout))?
        .map_err(|e| Error::Connection(Box::new(e)))?;

        let jetstream = jetstream::new(client.clone());

        let server_info = client.server_info();
        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            server_host = %server_info.host,
            server_version = %server_info.version,
            server_id = %server_info.server_id,
            max_payload = server_info.max_payload,
            "successfully connected to NATS"
        );

        Ok(Self {
            inner: Arc::new(NatsClientInner {
                client,
                jetstream,
                config,
            }),
        })
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &NatsConfig {
        &self.inner.config
    }

    /// Get the underlying core client
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.inner.client
    }

    /// Get the JetStream context
    #[must_use]
    pub fn jetstream(&self) -> &jetstream::Context {
        &self.inner.jetstream
    }

    /// Test connectivity with a ping
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CONNECTION)]
    pub async fn ping(&self) -> Result<Duration> {
        let start = std::time::Instant::now();
        let limit = Duration::from_secs(10);

        timeout(limit, self.inner.client.flush())
            .await
            .map_err(|_| Error::timeout(limit))?
            .map_err(|e| Error::Connection(Box::new(e)))?;

        let ping_time = start.elapsed();
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            duration_ms = ping_time.as_millis(),
            "NATS ping successful"
        );
        Ok(ping_time)
    }

    /// Check if the client is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(
            self.inner.client.connection_state(),
            async_nats::connection::State::Connected
        )
    }
}

// Status channel getters
impl NatsClient {
    /// Create a status channel bound to the stream type `S`.
    ///
    /// The stream is created on first use.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn status_channel<S>(&self, config: ChannelConfig) -> Result<NatsStatusChannel<S>>
    where
        S: StatusStream,
    {
        NatsStatusChannel::new(self.inner.client.clone(), &self.inner.jetstream, config).await
    }

    /// Create a status channel for the `jobs-status` queue.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn jobs_status_channel(
        &self,
        config: ChannelConfig,
    ) -> Result<NatsStatusChannel<JobsStatusStream>> {
        self.status_channel(config).await
    }
}
