//! HTTP transport for the ingestion API.
//!
//! One [`IngestionClient`] is shared by all delivery tasks; reqwest pools
//! connections underneath. The client maps transport and HTTP failures to
//! [`DeliveryError`] so the sender's retry accounting can treat every batch
//! uniformly.

use glimt_core::IngestionEvent;
use glimt_delivery::{DeliveryError, Result, Sink};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;

const INGESTION_PATH: &str = "/api/public/ingestion";

/// Request body of one ingestion call.
#[derive(Debug, Serialize)]
struct IngestionRequest<'a> {
    batch: &'a [IngestionEvent],
}

/// Response body of one ingestion call. The endpoint can accept a batch
/// partially; rejected events are reported here rather than via the status.
#[derive(Debug, Default, Deserialize)]
struct IngestionResponse {
    #[serde(default)]
    successes: Vec<Value>,
    #[serde(default)]
    errors: Vec<Value>,
}

/// Reqwest-backed sink delivering batches to the ingestion endpoint.
#[derive(Debug, Clone)]
pub struct IngestionClient {
    http: reqwest::Client,
    url: String,
    public_key: String,
    secret_key: String,
}

impl IngestionClient {
    /// Creates a transport from the client configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the underlying HTTP client cannot
    /// be built.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("glimt/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                DeliveryError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            url: format!("{}{}", config.host.trim_end_matches('/'), INGESTION_PATH),
            public_key: config.public_key.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    /// URL the transport posts batches to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl Sink<IngestionEvent> for IngestionClient {
    async fn send(&self, batch: &[IngestionEvent]) -> Result<()> {
        let response = self
            .http
            .post(&self.url)
            .basic_auth(&self.public_key, Some(&self.secret_key))
            .json(&IngestionRequest { batch })
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::network(error.to_string())
                }
            })?;

        let status = response.status();
        if status.is_client_error() {
            return Err(DeliveryError::client_error(status.as_u16()));
        }
        if !status.is_success() {
            return Err(DeliveryError::server_error(status.as_u16()));
        }

        // A successful status can still carry per-event rejections; those
        // are not retryable as a batch, so they are logged and accepted.
        match response.json::<IngestionResponse>().await {
            Ok(body) if !body.errors.is_empty() => {
                warn!(
                    rejected = body.errors.len(),
                    accepted = body.successes.len(),
                    "ingestion endpoint rejected some events"
                );
            }
            Ok(_) => {
                debug!(events = batch.len(), "batch ingested");
            }
            Err(error) => {
                debug!(error = %error, "could not parse ingestion response body");
            }
        }
        Ok(())
    }
}
