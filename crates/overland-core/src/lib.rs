// # overland-core
//
// Core library for the Overland availability watcher.
//
// ## Architecture Overview
//
// A run turns one scraped availability calendar into a notification decision:
// - **PageSource**: Trait for fetching a calendar page as normalized text lines
// - **availability**: Segmenter, Extractor and Window Filter over those lines
// - **diff**: State Differ comparing the interesting records to the last snapshot
// - **SnapshotStore**: Trait for the persisted snapshot (read once, written at most once)
// - **Notifier**: Trait for delivering the rendered alert text
// - **WatchEngine**: Orchestrates fetch → extract → filter → decide → notify → persist
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Parsing and diffing are pure; I/O lives behind traits
// 2. **Lenient parsing**: Malformed calendar lines are skipped, never fatal
// 3. **At-least-once notification**: The snapshot is only replaced after a successful send
// 4. **Library-First**: All logic can be driven from tests with injected windows and fixtures

pub mod availability;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod message;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use availability::{AvailabilityWindow, BookingStatus, DateRecord};
pub use config::{EngineConfig, NotifierConfig, SourceConfig, StateStoreConfig, WatchConfig, WindowConfig};
pub use diff::{NotificationDecision, Snapshot, SnapshotEntry};
pub use engine::{EngineEvent, RunReport, WatchEngine};
pub use error::{Error, Result};
pub use state::{FileSnapshotStore, MemorySnapshotStore};
pub use traits::{LogNotifier, Notifier, PageSource, SnapshotStore};
