use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;

use postback::error::PostbackError;

/// Result type for agent service operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Captured backtrace wrapper with a readable debug rendering.
pub struct CapturedBacktrace(Backtrace);

impl CapturedBacktrace {
    /// Captures a new backtrace for an error variant.
    fn capture() -> Self {
        Self(Backtrace::capture())
    }
}

impl fmt::Debug for CapturedBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for the agent service binary.
///
/// Wraps [`PostbackError`] for pipeline errors and provides variants for
/// infrastructure errors. Every variant reaching `main` maps to a non-zero
/// exit code; steady-state delivery and decode errors never surface here.
#[derive(Debug)]
pub enum AgentError {
    /// Pipeline or delivery-related error.
    Postback(PostbackError),
    /// Configuration error.
    Config(Box<dyn Error + Send + Sync>, CapturedBacktrace),
    /// I/O error.
    Io(std::io::Error, CapturedBacktrace),
}

impl AgentError {
    /// Returns a short category label for this error.
    pub fn category(&self) -> &'static str {
        match self {
            AgentError::Postback(_) => "pipeline error",
            AgentError::Config(_, _) => "configuration error",
            AgentError::Io(_, _) => "i/o error",
        }
    }

    /// Creates a configuration error from any boxed source.
    pub fn config<E: Error + Send + Sync + 'static>(err: E) -> Self {
        AgentError::Config(Box::new(err), CapturedBacktrace::capture())
    }
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::Postback(err) => write!(f, "{err}"),
            AgentError::Config(source, _) => write!(f, "configuration error: {source}"),
            AgentError::Io(source, _) => write!(f, "i/o error: {source}"),
        }
    }
}

impl Error for AgentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AgentError::Postback(err) => err.source(),
            AgentError::Config(source, _) => Some(source.as_ref()),
            AgentError::Io(source, _) => Some(source),
        }
    }
}

impl From<PostbackError> for AgentError {
    fn from(err: PostbackError) -> Self {
        AgentError::Postback(err)
    }
}

impl From<std::io::Error> for AgentError {
    fn from(err: std::io::Error) -> Self {
        AgentError::Io(err, CapturedBacktrace::capture())
    }
}
