//! Error types for producer-side operations.
//!
//! These errors are reported synchronously to the caller when a record is
//! rejected before it reaches the delivery pipeline. Delivery failures are
//! never surfaced here; the pipeline handles them internally.

use thiserror::Error;

/// Result type alias for producer-side operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the client facade before an event is enqueued.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A trace ID was required but missing.
    #[error("trace ID is required")]
    MissingTraceId,

    /// An observation ID was required but missing.
    #[error("observation ID is required")]
    MissingObservationId,

    /// Invalid client configuration.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl Error {
    /// Creates a configuration error from a message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_format() {
        assert_eq!(Error::MissingTraceId.to_string(), "trace ID is required");
        assert_eq!(
            Error::configuration("host must not be empty").to_string(),
            "invalid configuration: host must not be empty"
        );
    }
}
