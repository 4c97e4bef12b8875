//! Structural error types.
//!
//! Structural errors are the only failure class that aborts a capture or
//! restore run. Everything else is scoped to the entity that raised it.

/// Kinds of structural errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StructuralErrorKind {
    /// The target space does not exist or is not reachable
    #[display("Missing target space: {}", _0)]
    MissingTarget(String),
    /// The requested snapshot does not exist
    #[display("Missing snapshot: {}", _0)]
    MissingSnapshot(String),
    /// Capture or restore options failed validation
    #[display("Invalid options: {}", _0)]
    InvalidOptions(String),
}

/// Structural error with location tracking.
///
/// Raised for missing targets, missing snapshots, and malformed
/// configuration. A structural error aborts the whole run; it is never
/// downgraded to a logged per-entity failure.
///
/// # Examples
///
/// ```
/// use vermeer_error::{StructuralError, StructuralErrorKind};
///
/// let err = StructuralError::new(StructuralErrorKind::MissingTarget("space-1".into()));
/// assert!(format!("{}", err).contains("Missing target"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Structural Error: {} at line {} in {}", kind, line, file)]
pub struct StructuralError {
    /// The kind of error that occurred
    pub kind: StructuralErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StructuralError {
    /// Create a new structural error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StructuralErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
