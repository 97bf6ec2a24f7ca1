//! State differ
//!
//! Compares the interesting records of this run against the snapshot
//! persisted by the last notification and classifies the run:
//!
//! | previous | current vs previous | decision               | persist |
//! |----------|---------------------|------------------------|---------|
//! | absent   | -                   | `FirstRun`             | yes     |
//! | present  | equal               | `Unchanged`            | no      |
//! | present  | differs, non-empty  | `ChangedToAvailable`   | yes     |
//! | present  | differs, empty      | `ChangedToNone`        | yes     |
//!
//! Equality is exact equality of the ordered `{date, spots}` sequence. The
//! differ reports *that* something changed, never *which* dates did.
//!
//! [`StateDiffer`] is the only owner of the [`SnapshotStore`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::availability::DateRecord;
use crate::error::Result;
use crate::traits::SnapshotStore;

/// One persisted `{date, spots}` pair
///
/// Status is not persisted; only presence and spot count matter for diffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Calendar date
    pub date: NaiveDate,
    /// Remaining spots, `None` when the page gave no count
    pub spots: Option<u32>,
}

impl From<&DateRecord> for SnapshotEntry {
    fn from(record: &DateRecord) -> Self {
        Self {
            date: record.date,
            spots: record.spots,
        }
    }
}

/// Ordered snapshot of interesting records, ascending by date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    /// Build a snapshot from already-sorted entries
    pub fn new(entries: Vec<SnapshotEntry>) -> Self {
        Self { entries }
    }

    /// Reduce records to `{date, spots}` pairs, keeping their order
    pub fn from_records(records: &[DateRecord]) -> Self {
        Self {
            entries: records.iter().map(SnapshotEntry::from).collect(),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was available
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationDecision {
    /// No snapshot existed before this run
    FirstRun {
        /// Interesting records of this run (may be empty)
        records: Vec<DateRecord>,
    },

    /// Same `{date, spots}` sequence as the snapshot
    Unchanged,

    /// Sequence changed and something is available
    ChangedToAvailable {
        /// Interesting records of this run
        records: Vec<DateRecord>,
    },

    /// Sequence changed and nothing is available any more
    ChangedToNone,
}

impl NotificationDecision {
    /// Whether the run must replace the snapshot
    pub fn should_persist(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// Whether the run announces something
    ///
    /// A first run with nothing available is silent.
    pub fn should_notify(&self) -> bool {
        match self {
            Self::FirstRun { records } => !records.is_empty(),
            Self::Unchanged => false,
            Self::ChangedToAvailable { .. } | Self::ChangedToNone => true,
        }
    }

    /// Records carried by the decision
    pub fn records(&self) -> &[DateRecord] {
        match self {
            Self::FirstRun { records } | Self::ChangedToAvailable { records } => records,
            Self::Unchanged | Self::ChangedToNone => &[],
        }
    }

    /// Short name for logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstRun { .. } => "first_run",
            Self::Unchanged => "unchanged",
            Self::ChangedToAvailable { .. } => "changed_to_available",
            Self::ChangedToNone => "changed_to_none",
        }
    }
}

/// Classify the run
///
/// # Parameters
///
/// - `previous`: Persisted snapshot, `None` when absent
/// - `current`: Interesting records of this run, sorted by date
pub fn decide(previous: Option<&Snapshot>, current: &[DateRecord]) -> NotificationDecision {
    let Some(previous) = previous else {
        return NotificationDecision::FirstRun {
            records: current.to_vec(),
        };
    };

    if Snapshot::from_records(current) == *previous {
        NotificationDecision::Unchanged
    } else if current.is_empty() {
        NotificationDecision::ChangedToNone
    } else {
        NotificationDecision::ChangedToAvailable {
            records: current.to_vec(),
        }
    }
}

/// Owner of the persisted snapshot
///
/// Reads the snapshot once per run and writes it at most once.
pub struct StateDiffer {
    store: Box<dyn SnapshotStore>,
}

impl StateDiffer {
    /// Wrap a snapshot store
    pub fn new(store: Box<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Load the previous snapshot
    ///
    /// An unreadable snapshot is treated exactly like an absent one, which
    /// forces a `FirstRun` decision instead of failing the run.
    pub async fn previous(&self) -> Option<Snapshot> {
        match self.store.load().await {
            Ok(Some(snapshot)) => {
                debug!("Loaded snapshot with {} entries", snapshot.len());
                Some(snapshot)
            }
            Ok(None) => {
                info!("No snapshot found, treating this as the first run");
                None
            }
            Err(e) => {
                warn!("Snapshot unreadable, treating this as the first run: {}", e);
                None
            }
        }
    }

    /// Persist `current` as the new snapshot
    pub async fn commit(&self, current: &[DateRecord]) -> Result<()> {
        let snapshot = Snapshot::from_records(current);
        self.store.save(&snapshot).await?;
        info!("Snapshot written: {} entries", snapshot.len());
        Ok(())
    }
}
