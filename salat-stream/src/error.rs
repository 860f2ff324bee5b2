//! Error types for the salat-stream crate.

use salat_times::CalcError;

/// Errors that can occur while creating or feeding event streams.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The calculation behind a schedule failed
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalcError),

    /// The owner of the stream was disposed
    #[error("Event source has been disposed")]
    Disposed,

    /// Schedulers must be started from within a Tokio runtime
    #[error("No Tokio runtime available: {0}")]
    RuntimeUnavailable(String),
}

/// Convenience type alias for stream results.
pub type StreamResult<T> = Result<T, StreamError>;

/// Make sure a scheduler can spawn its timer task.
pub(crate) fn require_runtime() -> StreamResult<()> {
    tokio::runtime::Handle::try_current()
        .map(|_| ())
        .map_err(|e| StreamError::RuntimeUnavailable(e.to_string()))
}
