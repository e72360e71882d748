//! Client configuration.
//!
//! Credentials and endpoint come from the caller or from `GLIMT_*`
//! environment variables; pipeline tuning defaults to the values the
//! delivery crate exports and rarely needs changing.

use std::time::Duration;

use glimt_core::{Error, Result};
use glimt_delivery::{
    DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_BATCH_BYTES, DEFAULT_MAX_CONCURRENT_DRAINS,
    DEFAULT_PARALLELISM, DEFAULT_RETRY_CEILING,
};

/// Default flush cadence of the client. Shorter than the delivery crate's
/// fallback so interactive applications see their traces promptly.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(500);

/// Default timeout for one ingestion request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a [`Glimt`](crate::Glimt) client instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// API public key, sent as the basic-auth username.
    pub public_key: String,

    /// API secret key, sent as the basic-auth password.
    pub secret_key: String,

    /// Base URL of the ingestion host.
    pub host: String,

    /// Period of the background flush timer.
    pub flush_interval: Duration,

    /// Event buffer capacity in bytes.
    pub buffer_capacity: usize,

    /// Maximum number of timer-triggered drains in flight at once.
    pub max_concurrent_drains: usize,

    /// Maximum serialized payload per batch in bytes.
    pub max_batch_bytes: usize,

    /// Number of concurrent batch deliveries per drain.
    pub parallelism: usize,

    /// Number of delivery failures after which an event is dropped.
    pub retry_ceiling: u32,

    /// Timeout for one ingestion HTTP request.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            public_key: String::new(),
            secret_key: String::new(),
            host: "https://api.glimt.dev".to_string(),
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_concurrent_drains: DEFAULT_MAX_CONCURRENT_DRAINS,
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
            parallelism: DEFAULT_PARALLELISM,
            retry_ceiling: DEFAULT_RETRY_CEILING,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    /// Creates a configuration with explicit credentials and host.
    pub fn new(
        public_key: impl Into<String>,
        secret_key: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            secret_key: secret_key.into(),
            host: host.into(),
            ..Default::default()
        }
    }

    /// Loads credentials from the environment.
    ///
    /// Reads `GLIMT_PUBLIC_KEY` and `GLIMT_SECRET_KEY` (required) and
    /// `GLIMT_HOST` (optional, defaults to the hosted endpoint).
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a required variable is missing.
    pub fn from_env() -> Result<Self> {
        let public_key = std::env::var("GLIMT_PUBLIC_KEY")
            .map_err(|_| Error::configuration("GLIMT_PUBLIC_KEY is not set"))?;
        let secret_key = std::env::var("GLIMT_SECRET_KEY")
            .map_err(|_| Error::configuration("GLIMT_SECRET_KEY is not set"))?;

        let mut config = Self::new(public_key, secret_key, Config::default().host);
        if let Ok(host) = std::env::var("GLIMT_HOST") {
            config.host = host;
        }
        Ok(config)
    }

    /// Checks that the fields needed to reach the ingestion API are set.
    pub(crate) fn validate_for_transport(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(Error::configuration("host must not be empty"));
        }
        if self.public_key.is_empty() || self.secret_key.is_empty() {
            return Err(Error::configuration("public and secret API keys are required"));
        }
        Ok(())
    }
}
