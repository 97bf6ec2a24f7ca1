// # File Snapshot Store
//
// File-based implementation of SnapshotStore.
//
// ## Writes
//
// - Full replace: the whole snapshot is rewritten on every save
// - Atomic: new content goes to a `.tmp` sibling, then is renamed over the file
// - Lazy: the parent directory is only created on the first save
//
// ## Reads
//
// - Missing file: no snapshot (first run)
// - Unreadable or corrupt file: `Error::StateRead`, which the differ treats
//   as "no snapshot"
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "updated_at": "2026-01-09T12:00:00Z",
//   "entries": [
//     { "date": "2026-01-05", "spots": 1 },
//     { "date": "2026-01-09", "spots": null }
//   ]
// }
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::diff::Snapshot;
use crate::traits::SnapshotStore;

/// State file format version
/// Used for future migration if format changes
const STATE_FILE_VERSION: &str = "1.0";

/// File-based snapshot store
///
/// # Example
///
/// ```rust,no_run
/// use overland_core::state::FileSnapshotStore;
/// use overland_core::traits::SnapshotStore;
/// use overland_core::diff::Snapshot;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileSnapshotStore::new("/var/lib/overland/state.json").await?;
///
///     store.save(&Snapshot::default()).await?;
///     assert_eq!(store.load().await?, Some(Snapshot::default()));
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

/// Serializable state file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    updated_at: chrono::DateTime<chrono::Utc>,
    entries: Snapshot,
}

impl FileSnapshotStore {
    /// Create a file snapshot store
    ///
    /// Nothing on disk is touched here: the file is read by
    /// [`SnapshotStore::load`] and its parent directory is created by the
    /// first [`SnapshotStore::save`].
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        if path.as_os_str().is_empty() {
            return Err(Error::config("State file path cannot be empty"));
        }
        Ok(Self { path })
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Result<Option<Snapshot>, Error> {
        if !self.path.exists() {
            tracing::debug!("State file does not exist: {}", self.path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::state_read(format!(
                "Failed to read state file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let state_file: StateFileFormat = serde_json::from_str(&content).map_err(|e| {
            Error::state_read(format!(
                "Failed to parse state file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if state_file.version != STATE_FILE_VERSION {
            tracing::warn!(
                "State file version mismatch: expected {}, got {}. \
                Attempting to load anyway.",
                STATE_FILE_VERSION,
                state_file.version
            );
        }

        Ok(Some(state_file.entries))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), Error> {
        let state_file = StateFileFormat {
            version: STATE_FILE_VERSION.to_string(),
            updated_at: chrono::Utc::now(),
            entries: snapshot.clone(),
        };

        let json = serde_json::to_string_pretty(&state_file)
            .map_err(|e| Error::state_write(format!("Failed to serialize snapshot: {}", e)))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::state_write(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        // Write to temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_write(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::state_write(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::state_write(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_write(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Snapshot written to file: {}", self.path.display());
        Ok(())
    }
}
