//! Collaborator traits for the Overland watcher
//!
//! This module defines the abstract interfaces the engine drives.
//!
//! - [`PageSource`]: Fetch one calendar page as normalized text lines
//! - [`Notifier`]: Deliver an alert payload
//! - [`SnapshotStore`]: Persist the most recently notified snapshot

pub mod notifier;
pub mod page_source;
pub mod snapshot_store;

pub use notifier::{LogNotifier, Notifier};
pub use page_source::{PageSource, normalize_lines};
pub use snapshot_store::SnapshotStore;
