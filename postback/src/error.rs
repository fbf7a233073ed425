//! Error types and result definitions for the postback delivery agent.
//!
//! Provides an error system with classification and captured diagnostic
//! metadata. The [`PostbackError`] type supports single errors, errors with
//! additional detail, and multiple aggregated errors for pool failures.
//!
//! Transport-level delivery failures are deliberately not represented here:
//! they are data, folded into a delivery outcome, because a failed postback
//! must never unwind the pipeline.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Convenient result type for agent operations using [`PostbackError`] as the
/// error type.
pub type PostbackResult<T> = Result<T, PostbackError>;

/// Detailed payload stored for single [`PostbackError`] instances.
#[derive(Debug, Clone)]
struct ErrorPayload {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

/// Main error type for agent operations.
///
/// [`PostbackError`] can represent a single classified error or multiple
/// aggregated errors, the latter mainly used to capture several worker
/// failures at once when a pool is awaited.
#[derive(Debug, Clone)]
pub struct PostbackError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Single error payload holding rich metadata.
    Single(ErrorPayload),
    /// Multiple aggregated errors.
    Many {
        errors: Vec<PostbackError>,
        location: &'static Location<'static>,
    },
}

/// Specific categories of errors that can occur while running the agent.
///
/// The classification mirrors the propagation policy: startup kinds abort the
/// process, everything else is handled inside the component that detects it.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    // Startup errors, fatal before the pipeline runs.
    QueueConnectionFailed,
    ConfigError,

    // Steady-state queue errors, handled with backoff.
    QueueOperationFailed,

    // Decode errors, the offending message is dropped.
    DeserializationError,
    InvalidJob,

    // Sink errors, fatal at open, best-effort at write.
    SinkIoError,
    SerializationError,

    // Pool join failures.
    ConsumerWorkerPanic,
    DeliveryWorkerPanic,

    // General errors.
    IoError,
    Unknown,
}

impl PostbackError {
    /// Returns the [`ErrorKind`] of this error.
    ///
    /// For aggregated errors, returns the kind of the first error or
    /// [`ErrorKind::Unknown`] if the error list is empty.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.kind,
            ErrorRepr::Many { ref errors, .. } => errors
                .first()
                .map(|err| err.kind())
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns all [`ErrorKind`]s present in this error.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::Single(ref payload) => vec![payload.kind],
            ErrorRepr::Many { ref errors, .. } => errors
                .iter()
                .flat_map(|err| err.kinds())
                .collect::<Vec<_>>(),
        }
    }

    /// Returns the detailed error information if available.
    ///
    /// For aggregated errors, returns the detail of the first error that has
    /// one.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.detail.as_deref(),
            ErrorRepr::Many { ref errors, .. } => errors.iter().find_map(|e| e.detail()),
        }
    }

    /// Returns the captured backtrace for this error.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self.repr {
            ErrorRepr::Single(ref payload) => Some(payload.backtrace.as_ref()),
            ErrorRepr::Many { .. } => None,
        }
    }

    /// Returns the captured callsite location for this error.
    pub fn location(&self) -> &'static Location<'static> {
        match self.repr {
            ErrorRepr::Single(ref payload) => payload.location,
            ErrorRepr::Many { location, .. } => location,
        }
    }

    /// Attaches an originating [`error::Error`] to this error and returns the
    /// modified instance.
    ///
    /// Has no effect on aggregated errors because aggregates forward the
    /// first contained error as their source.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        if let ErrorRepr::Single(ref mut payload) = self.repr {
            payload.source = Some(Arc::new(source));
        }
        self
    }

    /// Creates a [`PostbackError`] from its components.
    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        let location = Location::caller();
        let backtrace = Arc::new(Backtrace::capture());

        PostbackError {
            repr: ErrorRepr::Single(ErrorPayload {
                kind,
                description,
                detail,
                source,
                location,
                backtrace,
            }),
        }
    }
}

impl PartialEq for PostbackError {
    fn eq(&self, other: &PostbackError) -> bool {
        match (&self.repr, &other.repr) {
            (ErrorRepr::Single(a), ErrorRepr::Single(b)) => a.kind == b.kind,
            (
                ErrorRepr::Many {
                    errors: errors_a, ..
                },
                ErrorRepr::Many {
                    errors: errors_b, ..
                },
            ) => {
                errors_a.len() == errors_b.len()
                    && errors_a.iter().zip(errors_b.iter()).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for PostbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match &self.repr {
            ErrorRepr::Single(payload) => {
                let location = payload.location;
                write!(
                    f,
                    "[{:?}] {} @ {}:{}:{}",
                    payload.kind,
                    payload.description,
                    location.file(),
                    location.line(),
                    location.column()
                )?;

                write_detail(payload.detail.as_deref(), f)?;

                Ok(())
            }
            ErrorRepr::Many { errors, location } => {
                let count = errors.len();
                write!(
                    f,
                    "[Many] {} error{} aggregated @ {}:{}:{}",
                    count,
                    if count == 1 { "" } else { "s" },
                    location.file(),
                    location.line(),
                    location.column()
                )?;

                for (index, error) in errors.iter().enumerate() {
                    let rendered = format!("{error}");
                    let mut lines = rendered.lines();
                    if let Some(first_line) = lines.next() {
                        write!(f, "\n  {}. {}", index + 1, first_line)?;
                    }
                    for line in lines {
                        write!(f, "\n     {line}")?;
                    }
                }

                Ok(())
            }
        }
    }
}

impl error::Error for PostbackError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.repr {
            ErrorRepr::Single(payload) => payload
                .source
                .as_ref()
                .map(|source| source as &(dyn error::Error + 'static)),
            // For aggregated errors, we forward the first contained error as
            // the source.
            ErrorRepr::Many { errors, .. } => errors
                .first()
                .map(|error| error as &(dyn error::Error + 'static)),
        }
    }
}

/// Writes the detail block with indentation.
fn write_detail(detail: Option<&str>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(detail) = detail {
        write!(f, "\n  Detail:")?;
        for line in detail.lines() {
            write!(f, "\n    {line}")?;
        }
    }

    Ok(())
}

/// Creates a [`PostbackError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for PostbackError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> PostbackError {
        PostbackError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates a [`PostbackError`] from an error kind, static description, and
/// dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for PostbackError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> PostbackError {
        PostbackError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Creates a [`PostbackError`] from a vector of errors for aggregation.
///
/// If the vector contains exactly one error, returns that error directly
/// without wrapping it in the aggregated variant.
impl<E> From<Vec<E>> for PostbackError
where
    E: Into<PostbackError>,
{
    #[track_caller]
    fn from(errors: Vec<E>) -> PostbackError {
        let location = Location::caller();

        let mut errors: Vec<PostbackError> = errors.into_iter().map(Into::into).collect();

        if errors.len() == 1 {
            return errors.pop().expect("just checked length is 1");
        }

        PostbackError {
            repr: ErrorRepr::Many { errors, location },
        }
    }
}

/// Converts [`std::io::Error`] to [`PostbackError`] with [`ErrorKind::IoError`].
impl From<std::io::Error> for PostbackError {
    #[track_caller]
    fn from(err: std::io::Error) -> PostbackError {
        let detail = err.to_string();
        let source = Arc::new(err);
        PostbackError::from_components(
            ErrorKind::IoError,
            Cow::Borrowed("I/O operation failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`serde_json::Error`] to [`PostbackError`] with the appropriate
/// error kind.
///
/// Maps to [`ErrorKind::DeserializationError`] for parse failures and
/// [`ErrorKind::IoError`] for I/O failures during serialization.
impl From<serde_json::Error> for PostbackError {
    #[track_caller]
    fn from(err: serde_json::Error) -> PostbackError {
        let (kind, description) = match err.classify() {
            serde_json::error::Category::Io => (ErrorKind::IoError, "JSON I/O operation failed"),
            serde_json::error::Category::Syntax
            | serde_json::error::Category::Data
            | serde_json::error::Category::Eof => (
                ErrorKind::DeserializationError,
                "JSON deserialization failed",
            ),
        };

        let detail = err.to_string();
        let source = Arc::new(err);
        PostbackError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`fred::error::Error`] to [`PostbackError`] with
/// [`ErrorKind::QueueOperationFailed`].
///
/// Connection-phase failures are classified separately by the queue client,
/// which knows whether it is still starting up.
impl From<fred::error::Error> for PostbackError {
    #[track_caller]
    fn from(err: fred::error::Error) -> PostbackError {
        let detail = err.to_string();
        let source = Arc::new(err);
        PostbackError::from_components(
            ErrorKind::QueueOperationFailed,
            Cow::Borrowed("Queue operation failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;
    use crate::postback_error;

    #[test]
    fn single_error_exposes_kind_and_detail() {
        let err = postback_error!(
            ErrorKind::InvalidJob,
            "Invalid job payload",
            "url is missing"
        );

        assert_eq!(err.kind(), ErrorKind::InvalidJob);
        assert_eq!(err.kinds(), vec![ErrorKind::InvalidJob]);
        assert_eq!(err.detail(), Some("url is missing"));
    }

    #[test]
    fn aggregated_errors_flatten_kinds() {
        let errors = vec![
            postback_error!(ErrorKind::ConsumerWorkerPanic, "Consumer worker panicked"),
            postback_error!(ErrorKind::DeliveryWorkerPanic, "Delivery worker panicked"),
        ];
        let err = PostbackError::from(errors);

        assert_eq!(err.kind(), ErrorKind::ConsumerWorkerPanic);
        assert_eq!(
            err.kinds(),
            vec![
                ErrorKind::ConsumerWorkerPanic,
                ErrorKind::DeliveryWorkerPanic
            ]
        );
    }

    #[test]
    fn single_element_vector_unwraps_to_inner_error() {
        let err = PostbackError::from(vec![postback_error!(
            ErrorKind::SinkIoError,
            "Sink write failed"
        )]);

        assert_eq!(err.kinds(), vec![ErrorKind::SinkIoError]);
    }

    #[test]
    fn display_includes_description_and_detail() {
        let err = postback_error!(
            ErrorKind::DeserializationError,
            "JSON deserialization failed",
            "expected value at line 1"
        );
        let rendered = format!("{err}");

        assert!(rendered.contains("JSON deserialization failed"));
        assert!(rendered.contains("expected value at line 1"));
    }

    #[test]
    fn source_is_preserved() {
        let io_err = std::io::Error::other("disk full");
        let err = postback_error!(ErrorKind::SinkIoError, "Sink write failed").with_source(io_err);

        assert!(err.source().is_some());
    }

    #[test]
    fn io_error_converts_to_io_kind() {
        let err: PostbackError = std::io::Error::other("boom").into();
        assert_eq!(err.kind(), ErrorKind::IoError);
    }

    #[test]
    fn serde_error_converts_to_deserialization_kind() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: PostbackError = parse_err.into();
        assert_eq!(err.kind(), ErrorKind::DeserializationError);
    }
}
