//! Snapshot store trait definition.

use vermeer_core::Snapshot;
use vermeer_error::VermeerResult;

/// Size and identity of a stored snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotInfo {
    /// Snapshot id
    pub id: String,
    /// Stored document size in KiB, rounded to two decimals
    pub size_kib: f64,
}

/// Trait for pluggable snapshot persistence backends.
///
/// A snapshot document is immutable once written; `save` with an id that
/// already exists replaces the stored document wholesale.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist a snapshot under its own id.
    async fn save(&self, snapshot: &Snapshot) -> VermeerResult<()>;

    /// Load the snapshot stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns a not-found storage error when no snapshot has that id;
    /// the failure is fatal to this call only.
    async fn load(&self, id: &str) -> VermeerResult<Snapshot>;

    /// List the ids of every stored snapshot.
    async fn list(&self) -> VermeerResult<Vec<String>>;

    /// Delete the snapshot stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns a not-found storage error when no snapshot has that id.
    async fn delete(&self, id: &str) -> VermeerResult<()>;

    /// Report the id and stored size of a snapshot.
    async fn info(&self, id: &str) -> VermeerResult<SnapshotInfo>;
}
