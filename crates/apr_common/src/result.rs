//! Common result and error types for the place-and-route core.

/// The standard result type for fallible internal operations.
///
/// `Ok` contains the result value (which may be partial or degraded after
/// error recovery). `Err` indicates an unrecoverable internal invariant
/// violation (a bug in the core), not a user-facing error. User-facing pass
/// failures use a typed `PassError` and are still returned as `Err` of that
/// type; this type is reserved for "this should never happen."
pub type ApResult<T> = Result<T, InternalError>;

/// An internal error indicating a broken invariant, not a user input problem.
///
/// These should never occur during normal operation: bucket bookkeeping gone
/// wrong, connection mirroring gone wrong, a key reused after removal. If one
/// does occur it means there is a logic error in the core that needs fixing,
/// not a condition a caller can recover from.
#[derive(Debug, thiserror::Error)]
#[error("internal invariant violation: {message}")]
pub struct InternalError {
    /// Description of the invariant that failed.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
