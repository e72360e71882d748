//! Error types for batch delivery.
//!
//! Produced by [`Sink`](crate::Sink) implementations and consumed by the
//! sender's failure accounting. Any error fails the whole batch for that
//! attempt; the distinction between variants exists for logging and for
//! transport implementations, not for control flow.

use thiserror::Error;

/// Result type alias for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Errors reported by a delivery sink.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// Network-level connectivity failure.
    #[error("network connection failed: {message}")]
    Network {
        /// Error message describing the network failure
        message: String,
    },

    /// The request timed out before a response arrived.
    #[error("request timed out")]
    Timeout,

    /// The sink rejected the batch (HTTP 4xx).
    #[error("client error: HTTP {status_code}")]
    ClientError {
        /// HTTP status code (4xx)
        status_code: u16,
    },

    /// The sink failed to process the batch (HTTP 5xx).
    #[error("server error: HTTP {status_code}")]
    ServerError {
        /// HTTP status code (5xx)
        status_code: u16,
    },

    /// Invalid sink configuration.
    #[error("invalid delivery configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl DeliveryError {
    /// Creates a network error from a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Creates a client error from an HTTP status.
    pub fn client_error(status_code: u16) -> Self {
        Self::ClientError { status_code }
    }

    /// Creates a server error from an HTTP status.
    pub fn server_error(status_code: u16) -> Self {
        Self::ServerError { status_code }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }
}
