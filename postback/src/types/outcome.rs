use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::types::Job;

/// The recorded result of one delivery attempt.
///
/// Produced by the executor and owned by the worker that invoked it, then
/// moved into the record sink and discarded. Outcomes are never stored in
/// shared state, so no synchronization is needed around them.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryOutcome {
    /// The job this outcome belongs to.
    pub job: Job,
    /// Wall-clock time the delivery attempt started.
    pub started_at: DateTime<Utc>,
    /// Elapsed time between starting the request and the final result.
    pub elapsed: Duration,
    /// How the attempt ended.
    pub status: DeliveryStatus,
}

impl DeliveryOutcome {
    /// Returns the HTTP status code, if the endpoint responded at all.
    pub fn status_code(&self) -> Option<u16> {
        match &self.status {
            DeliveryStatus::Delivered { status_code, .. } => Some(*status_code),
            DeliveryStatus::Failed { .. } => None,
        }
    }

    /// Returns whether the endpoint produced a response.
    ///
    /// Error status codes (4xx/5xx) still count as delivered: the call
    /// completed, which is all the pipeline guarantees.
    pub fn is_delivered(&self) -> bool {
        matches!(self.status, DeliveryStatus::Delivered { .. })
    }
}

/// Terminal state of a delivery attempt.
///
/// Exactly one of a response or a transport error exists per attempt, which
/// this enum enforces by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryStatus {
    /// The endpoint responded, with any status code.
    Delivered {
        /// HTTP status code of the response.
        status_code: u16,
        /// Response body, truncated to the configured read bound.
        response_body: String,
    },
    /// The request never completed at the transport level.
    Failed {
        /// What went wrong.
        error: TransportError,
    },
}

/// A transport-level delivery failure.
///
/// Deliberately not a [`crate::error::PostbackError`]: transport failures are
/// data that gets logged, never an error that propagates through the
/// pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// Failure category.
    pub kind: TransportErrorKind,
    /// Human-readable description from the HTTP client.
    pub message: String,
}

/// Categories of transport-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The configured request timeout elapsed.
    Timeout,
    /// The connection could not be established.
    Connect,
    /// Any other failure to complete the exchange.
    Request,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Request => "request",
        };

        write!(f, "{kind}: {}", self.message)
    }
}
