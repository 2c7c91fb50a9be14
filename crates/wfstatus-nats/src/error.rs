//! Error types and utilities for NATS operations.

use std::time::Duration;

use wfstatus_core::TransportError;

/// Result type for all NATS operations in this crate.
///
/// This is a convenience type alias that defaults to using [`Error`] as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for NATS operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// NATS client/connection errors
    #[error("NATS connection error: {0}")]
    Connection(#[from] async_nats::Error),

    /// Serialization errors when sending messages
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation timeout
    #[error("Operation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Message delivery failed
    #[error("Message delivery failed to subject '{subject}': {reason}")]
    DeliveryFailed { subject: String, reason: String },

    /// Stream operation failed
    #[error("Stream operation failed on '{stream}': {error}")]
    StreamError { stream: String, error: String },

    /// Invalid configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Create a delivery failed error
    pub fn delivery_failed(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DeliveryFailed {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Create a stream error
    pub fn stream_error(stream: impl Into<String>, error: impl Into<String>) -> Self {
        Self::StreamError {
            stream: stream.into(),
            error: error.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a timeout error with the given duration
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { timeout: duration }
    }

    /// Get a user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            Error::Connection(_) => {
                "Connection to NATS server failed. Please check your connection.".to_string()
            }
            Error::Timeout { timeout } => {
                format!("Operation timed out after {:?}. Please try again.", timeout)
            }
            Error::Serialization(_) => "Data format error. Please check your input.".to_string(),
            Error::InvalidConfig { reason } => format!("Configuration error: {}", reason),
            _ => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

impl From<Error> for TransportError {
    fn from(error: Error) -> Self {
        match error {
            Error::Connection(e) => TransportError::channel_closed(e.to_string()),
            Error::Serialization(e) => TransportError::from(e),
            Error::Timeout { timeout } => TransportError::timeout(timeout),
            Error::DeliveryFailed { subject, reason } => TransportError::rejected(subject, reason),
            Error::StreamError { stream, error } => TransportError::rejected(stream, error),
            Error::InvalidConfig { reason } => TransportError::channel_closed(reason),
        }
    }
}
