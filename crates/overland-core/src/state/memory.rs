// # Memory Snapshot Store
//
// In-memory implementation of SnapshotStore.
//
// ## When to Use
//
// - Testing environments
// - Dry runs where nothing should touch the disk
//
// All state is lost when the process exits, so every process start is a
// first run.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::Error;
use crate::diff::Snapshot;
use crate::traits::SnapshotStore;

/// In-memory snapshot store
///
/// Clones share the same snapshot and write counter.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<RwLock<Option<Snapshot>>>,
    writes: Arc<AtomicUsize>,
}

impl MemorySnapshotStore {
    /// Create an empty store (no snapshot)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `snapshot`
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(snapshot))),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Current snapshot, without counting as a load
    pub async fn snapshot(&self) -> Option<Snapshot> {
        self.inner.read().await.clone()
    }

    /// Number of successful saves
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Result<Option<Snapshot>, Error> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), Error> {
        *self.inner.write().await = Some(snapshot.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
