//! Tracker configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::transport::{DEFAULT_EXCHANGE, Destination, STATUS_QUEUE};

/// Identity and destination of a status tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct TrackerConfig {
    /// Identifier of the workflow being tracked
    #[cfg_attr(feature = "config", arg(long = "workflow-uuid", env = "WORKFLOW_UUID"))]
    pub workflow_uuid: String,

    /// Exchange to publish to (empty for the default exchange)
    #[cfg_attr(
        feature = "config",
        arg(long = "status-exchange", env = "STATUS_EXCHANGE", default_value = DEFAULT_EXCHANGE)
    )]
    #[serde(default)]
    pub status_exchange: String,

    /// Queue (routing key) receiving status messages
    #[cfg_attr(
        feature = "config",
        arg(long = "status-queue", env = "STATUS_QUEUE", default_value = STATUS_QUEUE)
    )]
    #[serde(default = "default_queue")]
    pub status_queue: String,
}

fn default_queue() -> String {
    STATUS_QUEUE.to_owned()
}

/// Characters that would split or widen a broker subject.
fn is_reserved(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | '*' | '>')
}

impl TrackerConfig {
    /// Creates a configuration publishing to `jobs-status` on the default exchange.
    pub fn new(workflow_uuid: impl Into<String>) -> Self {
        Self {
            workflow_uuid: workflow_uuid.into(),
            status_exchange: DEFAULT_EXCHANGE.to_owned(),
            status_queue: default_queue(),
        }
    }

    /// Set the exchange.
    #[must_use]
    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.status_exchange = exchange.into();
        self
    }

    /// Set the queue.
    #[must_use]
    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.status_queue = queue.into();
        self
    }

    /// Returns the destination described by this configuration.
    pub fn destination(&self) -> Destination {
        Destination::new(&self.status_exchange, &self.status_queue)
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        if self.workflow_uuid.trim().is_empty() {
            return Err("Workflow identifier cannot be empty".to_string());
        }

        if self.status_queue.trim().is_empty() {
            return Err("Status queue cannot be empty".to_string());
        }

        if self.status_queue.chars().any(is_reserved) {
            return Err(format!("Invalid status queue name: {}", self.status_queue));
        }

        if self.status_exchange.chars().any(is_reserved) {
            return Err(format!(
                "Invalid status exchange name: {}",
                self.status_exchange
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config() {
        let config = TrackerConfig::new("abc-123");
        assert_eq!(config.destination(), Destination::queue("jobs-status"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = TrackerConfig::new("abc-123")
            .with_exchange("reana")
            .with_queue("status");
        assert_eq!(config.destination(), Destination::new("reana", "status"));
    }

    #[test]
    fn test_config_validation() {
        assert!(TrackerConfig::new("").validate().is_err());
        assert!(TrackerConfig::new("  ").validate().is_err());
        assert!(TrackerConfig::new("abc").with_queue("").validate().is_err());
        assert!(TrackerConfig::new("abc").with_queue("jobs status").validate().is_err());
        assert!(TrackerConfig::new("abc").with_queue("jobs.*").validate().is_err());
        assert!(TrackerConfig::new("abc").with_exchange("a.b").validate().is_err());
        assert!(TrackerConfig::new("abc").with_exchange("*").validate().is_err());
        assert!(TrackerConfig::new("abc").with_exchange(">").validate().is_err());
        assert!(TrackerConfig::new("abc").with_exchange("re ana").validate().is_err());
        assert!(TrackerConfig::new("abc").with_exchange("reana").validate().is_ok());
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: TrackerConfig = serde_json::from_str(r#"{"workflow_uuid":"abc"}"#).unwrap();
        assert_eq!(config, TrackerConfig::new("abc"));
    }
}
