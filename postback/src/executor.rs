//! Delivery executor: performs one outbound HTTP call per job.
//!
//! The executor is infallible from the pipeline's point of view. Every
//! attempt produces a [`DeliveryOutcome`]: a response with any status code
//! (4xx/5xx included) is a completed delivery, and a transport-level failure
//! is folded into the outcome instead of propagating. A single unreachable
//! endpoint must never take a worker down with it.

use std::time::{Duration, Instant};

use chrono::Utc;
use futures::StreamExt;
use postback_config::shared::HttpClientConfig;
use reqwest::Response;
use tracing::debug;

use crate::error::{ErrorKind, PostbackResult};
use crate::postback_error;
use crate::types::{
    DeliveryOutcome, DeliveryStatus, HttpMethod, Job, TransportError, TransportErrorKind,
};

/// Marker appended to response bodies cut off at the read bound.
const TRUNCATION_MARKER: &str = "... (truncated)";

/// HTTP executor for postback deliveries.
///
/// Wraps a pooled [`reqwest::Client`] configured with a hard per-request
/// timeout, so a slow endpoint suspends a worker for a bounded time only.
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
    max_response_body_bytes: usize,
}

impl HttpExecutor {
    /// Creates a new executor from the HTTP client configuration.
    pub fn new(config: &HttpClientConfig) -> PostbackResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|err| {
                postback_error!(
                    ErrorKind::ConfigError,
                    "Failed to build HTTP client",
                    source: err
                )
            })?;

        Ok(Self {
            client,
            max_response_body_bytes: config.max_response_body_bytes,
        })
    }

    /// Delivers one postback and captures the result.
    ///
    /// Takes ownership of the job and moves it into the returned outcome,
    /// which the caller owns exclusively.
    pub async fn deliver(&self, job: Job) -> DeliveryOutcome {
        let started_at = Utc::now();
        let start = Instant::now();

        let status = match self.request(&job).await {
            Ok((status_code, response_body)) => {
                debug!(url = %job.url, status_code, "postback delivered");

                DeliveryStatus::Delivered {
                    status_code,
                    response_body,
                }
            }
            Err(error) => {
                debug!(url = %job.url, %error, "postback delivery failed");

                DeliveryStatus::Failed { error }
            }
        };

        DeliveryOutcome {
            job,
            started_at,
            elapsed: start.elapsed(),
            status,
        }
    }

    /// Performs the HTTP exchange for a job.
    async fn request(&self, job: &Job) -> Result<(u16, String), TransportError> {
        let response = match job.method {
            HttpMethod::Get => self.client.get(&job.url).send().await,
        }
        .map_err(categorize_transport_error)?;

        let status_code = response.status().as_u16();
        let body = self.read_bounded_body(response).await;

        Ok((status_code, body))
    }

    /// Reads a response body up to the configured bound.
    ///
    /// The body is consumed as a stream so an endpoint returning gigabytes
    /// costs at most `max_response_body_bytes` of memory. A read failure
    /// mid-body does not discard the delivery: the status code was already
    /// received, so the placeholder body keeps the outcome intact.
    async fn read_bounded_body(&self, response: Response) -> String {
        let mut body = Vec::with_capacity(1024);
        let mut truncated = false;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    return format!("[failed to read response body: {err}]");
                }
            };

            if body.len() + chunk.len() > self.max_response_body_bytes {
                let remaining = self.max_response_body_bytes - body.len();
                body.extend_from_slice(&chunk[..remaining]);
                truncated = true;
                break;
            }

            body.extend_from_slice(&chunk);
        }

        let mut body = String::from_utf8_lossy(&body).into_owned();
        if truncated {
            body.push_str(TRUNCATION_MARKER);
        }

        body
    }
}

/// Maps a [`reqwest::Error`] to a [`TransportError`] category.
fn categorize_transport_error(err: reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Request
    };

    TransportError {
        kind,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    use super::*;

    fn executor_with(config: HttpClientConfig) -> HttpExecutor {
        HttpExecutor::new(&config).unwrap()
    }

    fn get_job(url: String) -> Job {
        Job {
            method: HttpMethod::Get,
            url,
        }
    }

    #[tokio::test]
    async fn successful_delivery_captures_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/cb"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .mount(&server)
            .await;

        let executor = executor_with(HttpClientConfig::default());
        let outcome = executor.deliver(get_job(format!("{}/cb", server.uri()))).await;

        assert_eq!(outcome.status_code(), Some(200));
        assert_eq!(
            outcome.status,
            DeliveryStatus::Delivered {
                status_code: 200,
                response_body: "OK".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn error_status_is_still_a_delivery() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let executor = executor_with(HttpClientConfig::default());
        let outcome = executor.deliver(get_job(server.uri())).await;

        assert!(outcome.is_delivered());
        assert_eq!(outcome.status_code(), Some(503));
    }

    #[tokio::test]
    async fn timeout_produces_failed_outcome() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let executor = executor_with(HttpClientConfig {
            request_timeout_ms: 50,
            ..HttpClientConfig::default()
        });
        let outcome = executor.deliver(get_job(server.uri())).await;

        assert!(!outcome.is_delivered());
        assert_eq!(outcome.status_code(), None);
        match outcome.status {
            DeliveryStatus::Failed { error } => {
                assert_eq!(error.kind, TransportErrorKind::Timeout);
            }
            DeliveryStatus::Delivered { .. } => panic!("expected a transport failure"),
        }
    }

    #[tokio::test]
    async fn refused_connection_produces_failed_outcome() {
        let executor = executor_with(HttpClientConfig::default());

        // Port 1 is reserved and nothing listens there.
        let outcome = executor
            .deliver(get_job("http://127.0.0.1:1/cb".to_string()))
            .await;

        match outcome.status {
            DeliveryStatus::Failed { error } => {
                assert_eq!(error.kind, TransportErrorKind::Connect);
            }
            DeliveryStatus::Delivered { .. } => panic!("expected a transport failure"),
        }
    }

    #[tokio::test]
    async fn oversized_body_is_truncated_at_the_bound() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(4096)))
            .mount(&server)
            .await;

        let executor = executor_with(HttpClientConfig {
            max_response_body_bytes: 128,
            ..HttpClientConfig::default()
        });
        let outcome = executor.deliver(get_job(server.uri())).await;

        match outcome.status {
            DeliveryStatus::Delivered { response_body, .. } => {
                assert!(response_body.ends_with(TRUNCATION_MARKER));
                assert_eq!(response_body.len(), 128 + TRUNCATION_MARKER.len());
            }
            DeliveryStatus::Failed { .. } => panic!("expected a delivery"),
        }
    }
}
