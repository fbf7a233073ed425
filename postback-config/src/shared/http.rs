use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Configuration for the outbound HTTP client used by the delivery executor.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpClientConfig {
    /// Hard timeout, in milliseconds, for a single delivery request.
    ///
    /// Bounds how long a worker can be suspended on one endpoint.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Maximum number of response body bytes to read and record.
    ///
    /// Bodies past this bound are truncated rather than buffered.
    #[serde(default = "default_max_response_body_bytes")]
    pub max_response_body_bytes: usize,
    /// User agent header sent with every delivery.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpClientConfig {
    /// Default per-request timeout in milliseconds.
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

    /// Default response body read bound.
    pub const DEFAULT_MAX_RESPONSE_BODY_BYTES: usize = 64 * 1024;

    /// Validates HTTP client configuration settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.request_timeout_ms == 0 {
            return Err(ValidationError::RequestTimeoutZero);
        }

        if self.max_response_body_bytes == 0 {
            return Err(ValidationError::MaxResponseBodyBytesZero);
        }

        Ok(())
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            max_response_body_bytes: default_max_response_body_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    HttpClientConfig::DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_max_response_body_bytes() -> usize {
    HttpClientConfig::DEFAULT_MAX_RESPONSE_BODY_BYTES
}

fn default_user_agent() -> String {
    concat!("postback-agent/", env!("CARGO_PKG_VERSION")).to_string()
}
