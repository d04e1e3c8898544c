//! Snapshot persistence for the delivery queue.
//!
//! The store writes the whole collection to a single JSON file after every
//! queue mutation and reads it back once at startup. A missing or unreadable
//! file is an empty queue, never a startup failure: the in-memory queue is
//! authoritative while the process runs, the file is the restart backup.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info};

use super::entry::QueueEntry;

/// Errors from snapshot writes.
///
/// Load failures are deliberately not represented: they degrade to an empty
/// queue at the call site.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write queue snapshot: {0}")]
    Write(#[from] std::io::Error),
    #[error("failed to serialize queue snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed snapshot store for queue entries.
#[derive(Debug, Clone)]
pub struct QueueStore {
    path: PathBuf,
}

impl QueueStore {
    /// Create a store writing to the given path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted entries.
    ///
    /// Missing file, unreadable file, and malformed JSON all yield an empty
    /// queue. Entries in a malformed file are not recovered.
    pub async fn load(&self) -> Vec<QueueEntry> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "queue_file_absent");
                return Vec::new();
            }
            Err(e) => {
                error!(
                    path = %self.path.display(),
                    error = %e,
                    "queue_file_read_failed"
                );
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<QueueEntry>>(&bytes) {
            Ok(entries) => {
                info!(
                    path = %self.path.display(),
                    entry_count = entries.len(),
                    "queue_file_loaded"
                );
                entries
            }
            Err(e) => {
                error!(
                    path = %self.path.display(),
                    error = %e,
                    "queue_file_malformed"
                );
                Vec::new()
            }
        }
    }

    /// Rewrite the snapshot with the full collection.
    pub async fn save(&self, entries: &[QueueEntry]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(entries)?;
        tokio::fs::write(&self.path, &bytes).await?;
        Ok(())
    }
}
