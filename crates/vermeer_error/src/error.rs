//! Top-level error wrapper types.

use crate::{
    ConfigError, DirectoryError, EntityError, HttpError, JsonError, StorageError, StorageErrorKind,
    StructuralError,
};

/// This is the foundation error enum. Each variant wraps one of the
/// per-domain error types defined in this crate.
///
/// # Examples
///
/// ```
/// use vermeer_error::{VermeerError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: VermeerError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum VermeerErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Snapshot storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Structural error (fatal to the run)
    #[from(StructuralError)]
    Structural(StructuralError),
    /// Per-entity error (logged, run continues)
    #[from(EntityError)]
    Entity(EntityError),
    /// Remote directory error
    #[from(DirectoryError)]
    Directory(DirectoryError),
}

/// Vermeer error with kind discrimination.
///
/// # Examples
///
/// ```
/// use vermeer_error::{VermeerResult, ConfigError};
///
/// fn might_fail() -> VermeerResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Vermeer Error: {}", _0)]
pub struct VermeerError(Box<VermeerErrorKind>);

impl VermeerError {
    /// Create a new error from a kind.
    pub fn new(kind: VermeerErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VermeerErrorKind {
        &self.0
    }

    /// True when this error is fatal to a whole capture or restore run.
    pub fn is_structural(&self) -> bool {
        matches!(self.kind(), VermeerErrorKind::Structural(_))
    }

    /// True when this is the distinguished oversize-payload failure.
    pub fn is_oversize_payload(&self) -> bool {
        matches!(
            self.kind(),
            VermeerErrorKind::Directory(e) if e.is_oversize_payload()
        )
    }

    /// True when this is a storage not-found failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind(),
            VermeerErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::NotFound(_))
        )
    }
}

// Generic From implementation for any type that converts to VermeerErrorKind
impl<T> From<T> for VermeerError
where
    T: Into<VermeerErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Vermeer operations.
///
/// # Examples
///
/// ```
/// use vermeer_error::{VermeerResult, HttpError};
///
/// fn fetch_data() -> VermeerResult<String> {
///     Err(HttpError::new("404 Not Found"))?
/// }
/// ```
pub type VermeerResult<T> = std::result::Result<T, VermeerError>;
