//! Filesystem-based snapshot storage implementation.

use crate::{SnapshotInfo, SnapshotStore};
use std::path::PathBuf;
use vermeer_core::Snapshot;
use vermeer_error::{StorageError, StorageErrorKind, VermeerResult};

/// Filesystem storage backend.
///
/// Stores one `{id}.json` document per snapshot under a configurable root
/// directory.
///
/// # Example
///
/// ```no_run
/// use vermeer_storage::FileSystemSnapshotStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = FileSystemSnapshotStore::new("/var/vermeer/snapshots")?;
/// # Ok(())
/// # }
/// ```
pub struct FileSystemSnapshotStore {
    root: PathBuf,
    pretty: bool,
}

impl FileSystemSnapshotStore {
    /// Create a new filesystem store rooted at `root`.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(root))]
    pub fn new(root: impl Into<PathBuf>) -> VermeerResult<Self> {
        let root = root.into();

        std::fs::create_dir_all(&root).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                root.display(),
                e
            )))
        })?;

        tracing::info!(path = %root.display(), "Created filesystem snapshot store");
        Ok(Self {
            root,
            pretty: false,
        })
    }

    /// Write documents with pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Resolve the document path for an id, rejecting ids that would
    /// escape the storage root.
    fn path_for(&self, id: &str) -> VermeerResult<PathBuf> {
        if id.is_empty()
            || id.contains('/')
            || id.contains('\\')
            || id.contains("..")
            || id.contains(std::path::MAIN_SEPARATOR)
        {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(
                id.to_string(),
            )))?;
        }
        Ok(self.root.join(format!("{id}.json")))
    }
}

#[async_trait::async_trait]
impl SnapshotStore for FileSystemSnapshotStore {
    #[tracing::instrument(skip(self, snapshot), fields(id = %snapshot.id))]
    async fn save(&self, snapshot: &Snapshot) -> VermeerResult<()> {
        let path = self.path_for(&snapshot.id)?;

        let encoded = if self.pretty {
            serde_json::to_vec_pretty(snapshot)
        } else {
            serde_json::to_vec(snapshot)
        }
        .map_err(|e| StorageError::new(StorageErrorKind::InvalidDocument(e.to_string())))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &encoded).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::info!(
            id = %snapshot.id,
            path = %path.display(),
            size = encoded.len(),
            "Stored snapshot"
        );

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn load(&self, id: &str) -> VermeerResult<Snapshot> {
        let path = self.path_for(id)?;

        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(id.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        let snapshot = serde_json::from_slice(&data)
            .map_err(|e| StorageError::new(StorageErrorKind::InvalidDocument(e.to_string())))?;

        tracing::debug!(id, size = data.len(), "Loaded snapshot");

        Ok(snapshot)
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self) -> VermeerResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                self.root.display(),
                e
            )))
        })?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                self.root.display(),
                e
            )))
        })? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }

        ids.sort();
        Ok(ids)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &str) -> VermeerResult<()> {
        let path = self.path_for(id)?;

        tokio::fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(id.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "delete {}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        tracing::info!(id, "Deleted snapshot");

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn info(&self, id: &str) -> VermeerResult<SnapshotInfo> {
        let path = self.path_for(id)?;

        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(id.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        let size_kib = (metadata.len() as f64 / 1024.0 * 100.0).round() / 100.0;

        Ok(SnapshotInfo {
            id: id.to_string(),
            size_kib,
        })
    }
}
