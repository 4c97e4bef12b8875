//! Remote directory error types.

/// Kinds of remote directory failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DirectoryErrorKind {
    /// The remote API rejected or failed the call
    #[display("API call failed: {}", _0)]
    Api(String),
    /// The request payload exceeded the remote size limit.
    ///
    /// Message replay treats this kind specially: it silently curtails the
    /// remaining sends for the current channel, with no retry and no log.
    #[display("Request entity too large")]
    OversizePayload,
    /// The requested entity does not exist on the target
    #[display("Not found: {}", _0)]
    NotFound(String),
    /// The target lacks the capability required by the call
    #[display("Missing capability: {}", _0)]
    MissingCapability(String),
}

/// Remote directory error with location tracking.
///
/// # Examples
///
/// ```
/// use vermeer_error::{DirectoryError, DirectoryErrorKind};
///
/// let err = DirectoryError::new(DirectoryErrorKind::OversizePayload);
/// assert!(err.is_oversize_payload());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Directory Error: {} at line {} in {}", kind, line, file)]
pub struct DirectoryError {
    /// The kind of error that occurred
    pub kind: DirectoryErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DirectoryError {
    /// Create a new directory error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DirectoryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// True when this is the distinguished oversize-payload failure.
    pub fn is_oversize_payload(&self) -> bool {
        self.kind == DirectoryErrorKind::OversizePayload
    }
}
