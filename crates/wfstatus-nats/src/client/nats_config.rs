//! NATS connection configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Configuration for NATS connections with sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct NatsConfig {
    /// NATS server URL (comma-separated for clustering)
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-url", env = "NATS_URL", default_value = DEFAULT_URL)
    )]
    pub nats_url: String,

    /// Authentication token (optional for unauthenticated servers)
    #[cfg_attr(feature = "config", arg(long = "nats-token", env = "NATS_TOKEN"))]
    #[serde(default)]
    pub nats_token: Option<String>,

    /// Client connection name for debugging and monitoring
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-client-name", env = "NATS_CLIENT_NAME")
    )]
    #[serde(default)]
    pub nats_client_name: Option<String>,

    /// Connection timeout in seconds (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-connect-timeout", env = "NATS_CONNECT_TIMEOUT_SECS")
    )]
    #[serde(default)]
    pub nats_connect_timeout: Option<u64>,

    /// Maximum number of reconnection attempts (0 = unlimited)
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-max-reconnects", env = "NATS_MAX_RECONNECTS")
    )]
    #[serde(default)]
    pub nats_max_reconnects: Option<usize>,
}

// Default values
const DEFAULT_URL: &str = "nats://localhost:4222";
const DEFAULT_NAME: &str = "wfstatus";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RECONNECTS: usize = 10;
const DEFAULT_RECONNECT_DELAY_SECS: u64 = 2;
const DEFAULT_PING_INTERVAL_SECS: u64 = 30;
const MAX_RECONNECT_DELAY_SECS: u64 = 30;

impl Default for NatsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

impl NatsConfig {
    /// Create a new configuration with server URL(s) and no credentials.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            nats_url: server_url.into(),
            nats_token: None,
            nats_client_name: None,
            nats_connect_timeout: None,
            nats_max_reconnects: None,
        }
    }

    /// Returns the client name, using the default if not set.
    #[inline]
    pub fn name(&self) -> &str {
        self.nats_client_name.as_deref().unwrap_or(DEFAULT_NAME)
    }

    /// Returns the server URLs as a vector (splits comma-separated URLs).
    pub fn servers(&self) -> Vec<&str> {
        self.nats_url.split(',').map(str::trim).collect()
    }

    /// Returns the connection timeout, falling back to 30 seconds.
    #[inline]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.nats_connect_timeout
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Returns the ping interval as a Duration.
    #[inline]
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(DEFAULT_PING_INTERVAL_SECS)
    }

    /// Returns the max reconnects as Option (0 means unlimited).
    #[inline]
    pub fn max_reconnects_option(&self) -> Option<usize> {
        let max = self.nats_max_reconnects.unwrap_or(DEFAULT_MAX_RECONNECTS);
        if max == 0 { None } else { Some(max) }
    }

    /// Delay before the given reconnection attempt.
    ///
    /// Doubles with every attempt starting from 2 seconds, capped at 30 seconds.
    pub fn reconnect_delay(&self, attempts: usize) -> Duration {
        let factor = 2_u64.saturating_pow(attempts.min(32) as u32);
        Duration::from_secs(
            DEFAULT_RECONNECT_DELAY_SECS
                .saturating_mul(factor)
                .min(MAX_RECONNECT_DELAY_SECS),
        )
    }

    /// Set server URL(s).
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.nats_url = url.into();
        self
    }

    /// Set the authentication token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.nats_token = Some(token.into());
        self
    }

    /// Set the client connection name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.nats_client_name = Some(name.into());
        self
    }

    /// Set the connection timeout in seconds.
    #[must_use]
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.nats_connect_timeout = Some(secs);
        self
    }

    /// Set maximum reconnection attempts (0 for unlimited).
    #[must_use]
    pub fn with_max_reconnects(mut self, max_reconnects: usize) -> Self {
        self.nats_max_reconnects = Some(max_reconnects);
        self
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        for server in self.servers() {
            if server.is_empty() {
                return Err("Server URL cannot be empty".to_string());
            }
            if !server.starts_with("nats://") && !server.starts_with("tls://") {
                return Err(format!("Invalid server URL format: {}", server));
            }
        }

        if self.nats_token.as_deref().is_some_and(str::is_empty) {
            return Err("Token cannot be empty when provided".to_string());
        }

        if self.nats_connect_timeout == Some(0) {
            return Err("Connection timeout must be positive".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config() {
        let config = NatsConfig::new("nats://localhost:4222");
        assert_eq!(config.servers(), vec!["nats://localhost:4222"]);
        assert_eq!(config.nats_token, None);
        assert_eq!(config.name(), "wfstatus");
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_reconnects_option(), Some(10));
    }

    #[test]
    fn test_config_builder() {
        let config = NatsConfig::default()
            .with_token("secret")
            .with_name("yadage-tracker")
            .with_connect_timeout_secs(5)
            .with_max_reconnects(5);

        assert_eq!(config.nats_token.as_deref(), Some("secret"));
        assert_eq!(config.name(), "yadage-tracker");
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_reconnects_option(), Some(5));
    }

    #[test]
    fn test_unlimited_reconnects() {
        let config = NatsConfig::default().with_max_reconnects(0);
        assert_eq!(config.max_reconnects_option(), None);
    }

    #[test]
    fn test_config_validation() {
        assert!(NatsConfig::default().validate().is_ok());
        assert!(NatsConfig::new("tls://broker:4222").validate().is_ok());
        assert!(NatsConfig::new("").validate().is_err());
        assert!(NatsConfig::new("amqp://localhost").validate().is_err());
        assert!(NatsConfig::default().with_token("").validate().is_err());
        assert!(
            NatsConfig::default()
                .with_connect_timeout_secs(0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_multiple_servers() {
        let config = NatsConfig::new("nats://a:4222, nats://b:4222,nats://c:4222");
        assert_eq!(
            config.servers(),
            vec!["nats://a:4222", "nats://b:4222", "nats://c:4222"]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reconnect_backoff() {
        let config = NatsConfig::default();
        assert_eq!(config.reconnect_delay(0), Duration::from_secs(2));
        assert_eq!(config.reconnect_delay(1), Duration::from_secs(4));
        assert_eq!(config.reconnect_delay(3), Duration::from_secs(16));
        assert_eq!(config.reconnect_delay(4), Duration::from_secs(30));
        assert_eq!(config.reconnect_delay(100), Duration::from_secs(30));
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: NatsConfig =
            serde_json::from_str(r#"{"nats_url":"nats://broker:4222"}"#).unwrap();
        assert_eq!(config.servers(), vec!["nats://broker:4222"]);
        assert_eq!(config.ping_interval(), Duration::from_secs(30));
    }
}
