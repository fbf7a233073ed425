use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PostbackResult;
use crate::types::{DeliveryOutcome, DeliveryStatus};

/// Trait for sinks that record delivery outcomes.
///
/// The outcome is moved into the sink: after recording, nothing retains it.
/// Sink failures are observability degradation, not pipeline failures;
/// callers log the error and keep delivering.
pub trait RecordSink {
    /// Records one delivery outcome.
    fn record(&self, outcome: DeliveryOutcome) -> impl Future<Output = PostbackResult<()>> + Send;
}

/// Serializable log-line form of a [`DeliveryOutcome`].
///
/// Emitted as one JSON object per line. Field names are part of the agent's
/// output contract: downstream parsers rely on them, so they stay stable.
/// Exactly one of `response_code` and `error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// HTTP verb the postback was delivered with.
    pub method: String,
    /// Endpoint the postback was delivered to.
    pub url: String,
    /// Wall-clock time the delivery attempt started.
    pub delivery_time: DateTime<Utc>,
    /// Response status code, when the endpoint responded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<u16>,
    /// Transport failure description, when the endpoint did not respond.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Elapsed request time in milliseconds.
    pub response_time_ms: u64,
    /// Response body, truncated to the configured read bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
}

impl From<&DeliveryOutcome> for DeliveryRecord {
    fn from(outcome: &DeliveryOutcome) -> Self {
        let (response_code, error, response_body) = match &outcome.status {
            DeliveryStatus::Delivered {
                status_code,
                response_body,
            } => (Some(*status_code), None, Some(response_body.clone())),
            DeliveryStatus::Failed { error } => (None, Some(error.to_string()), None),
        };

        DeliveryRecord {
            method: outcome.job.method.as_str().to_string(),
            url: outcome.job.url.clone(),
            delivery_time: outcome.started_at,
            response_code,
            error,
            response_time_ms: outcome.elapsed.as_millis() as u64,
            response_body,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::types::{HttpMethod, Job, TransportError, TransportErrorKind};

    use super::*;

    fn outcome_with(status: DeliveryStatus) -> DeliveryOutcome {
        DeliveryOutcome {
            job: Job {
                method: HttpMethod::Get,
                url: "https://example.test/cb".to_string(),
            },
            started_at: Utc::now(),
            elapsed: Duration::from_millis(42),
            status,
        }
    }

    #[test]
    fn delivered_outcome_maps_to_response_fields() {
        let record = DeliveryRecord::from(&outcome_with(DeliveryStatus::Delivered {
            status_code: 200,
            response_body: "OK".to_string(),
        }));

        assert_eq!(record.method, "GET");
        assert_eq!(record.response_code, Some(200));
        assert_eq!(record.response_body.as_deref(), Some("OK"));
        assert_eq!(record.error, None);
        assert_eq!(record.response_time_ms, 42);
    }

    #[test]
    fn failed_outcome_maps_to_error_field() {
        let record = DeliveryRecord::from(&outcome_with(DeliveryStatus::Failed {
            error: TransportError {
                kind: TransportErrorKind::Timeout,
                message: "deadline elapsed".to_string(),
            },
        }));

        assert_eq!(record.response_code, None);
        assert_eq!(record.response_body, None);
        assert_eq!(record.error.as_deref(), Some("timeout: deadline elapsed"));
    }

    #[test]
    fn serialized_record_omits_absent_fields() {
        let record = DeliveryRecord::from(&outcome_with(DeliveryStatus::Failed {
            error: TransportError {
                kind: TransportErrorKind::Connect,
                message: "connection refused".to_string(),
            },
        }));
        let line = serde_json::to_string(&record).unwrap();

        assert!(line.contains("\"error\""));
        assert!(!line.contains("\"response_code\""));
        assert!(!line.contains("\"response_body\""));
    }
}
