//! Per-entity error types.

/// Kinds of per-entity failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum EntityErrorKind {
    /// Creating an entity failed
    #[display("Failed to create {} '{}': {}", entity, name, reason)]
    Create {
        /// Entity kind, e.g. "role" or "channel"
        entity: &'static str,
        /// Display name of the entity
        name: String,
        /// Underlying failure message
        reason: String,
    },
    /// Editing an entity failed
    #[display("Failed to edit {} '{}': {}", entity, name, reason)]
    Edit {
        /// Entity kind
        entity: &'static str,
        /// Display name of the entity
        name: String,
        /// Underlying failure message
        reason: String,
    },
    /// Deleting an entity failed
    #[display("Failed to delete {} '{}': {}", entity, name, reason)]
    Delete {
        /// Entity kind
        entity: &'static str,
        /// Display name of the entity
        name: String,
        /// Underlying failure message
        reason: String,
    },
}

/// A single create/edit/delete call failed.
///
/// Entity errors are logged at the call site and the run continues; the
/// entity is simply absent from the resulting remap. They never escalate
/// into a whole-run failure.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Entity Error: {} at line {} in {}", kind, line, file)]
pub struct EntityError {
    /// The kind of error that occurred
    pub kind: EntityErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl EntityError {
    /// Create a new entity error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: EntityErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
