// # Snapshot Store Trait
//
// Defines the interface for the persisted snapshot.
//
// ## Purpose
//
// The snapshot is the interesting record set announced by the last
// notification. It is read once at the start of a run and replaced at most
// once at the end. Its absence marks the first run ever observed.
//
// ## Implementations
//
// - File-based: JSON file with write-then-rename
// - In-memory: tests and dry runs

use async_trait::async_trait;

use crate::diff::Snapshot;

/// Trait for snapshot store implementations
///
/// # Concurrency
///
/// Stores assume a single runner. No locking is done across processes.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the persisted snapshot
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Snapshot))`: The last persisted snapshot
    /// - `Ok(None)`: Nothing persisted yet
    /// - `Err(Error::StateRead)`: Snapshot exists but cannot be read
    async fn load(&self) -> Result<Option<Snapshot>, crate::Error>;

    /// Replace the persisted snapshot
    ///
    /// This is a full replace, never an append.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Snapshot durably written
    /// - `Err(Error::StateWrite)`: Storage error
    async fn save(&self, snapshot: &Snapshot) -> Result<(), crate::Error>;
}
