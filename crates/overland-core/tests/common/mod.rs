//! Test doubles and common utilities for run contract tests
//!
//! These doubles record how the engine drives its collaborators without
//! doing any real I/O.

#![allow(dead_code)]

use chrono::NaiveDate;
use overland_core::config::{EngineConfig, WatchConfig};
use overland_core::diff::Snapshot;
use overland_core::error::{Error, Result};
use overland_core::traits::{Notifier, PageSource, SnapshotStore, normalize_lines};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A page source that serves pages from a script
///
/// Each call pops the next scripted response; when the script runs out the
/// last page is served again. Cursors passed in are recorded.
#[derive(Clone)]
pub struct ScriptedPageSource {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    last_page: Arc<Mutex<String>>,
    cursors: Arc<Mutex<Vec<Option<NaiveDate>>>>,
    fetch_count: Arc<AtomicUsize>,
    paginated: bool,
}

impl ScriptedPageSource {
    /// Single-page source that always serves `page`
    pub fn single(page: &str) -> Self {
        Self::build(vec![Ok(page.to_string())], false)
    }

    /// Paginating source serving `pages` in order
    pub fn paginated(pages: &[&str]) -> Self {
        Self::build(pages.iter().map(|p| Ok(p.to_string())).collect(), true)
    }

    /// Single-page source serving scripted results in order
    pub fn scripted(responses: Vec<Result<String>>) -> Self {
        Self::build(responses, false)
    }

    fn build(responses: Vec<Result<String>>, paginated: bool) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            last_page: Arc::new(Mutex::new(String::new())),
            cursors: Arc::new(Mutex::new(Vec::new())),
            fetch_count: Arc::new(AtomicUsize::new(0)),
            paginated,
        }
    }

    /// Number of fetch_lines() calls
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Cursors passed to fetch_lines(), in call order
    pub fn cursors(&self) -> Vec<Option<NaiveDate>> {
        self.cursors.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PageSource for ScriptedPageSource {
    async fn fetch_lines(&self, cursor: Option<NaiveDate>) -> Result<Vec<String>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.cursors.lock().unwrap().push(cursor);

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(page)) => {
                *self.last_page.lock().unwrap() = page.clone();
                Ok(normalize_lines(&page))
            }
            Some(Err(e)) => Err(e),
            None => Ok(normalize_lines(&self.last_page.lock().unwrap())),
        }
    }

    fn supports_pagination(&self) -> bool {
        self.paginated
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// A notifier that records payloads and can be switched to fail
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    attempts: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Payloads delivered successfully
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of send() calls, successful or not
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::delivery("403 Forbidden: bot was blocked by the user"));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "recording"
    }
}

/// A snapshot store that counts loads and saves and can be corrupted
#[derive(Clone, Default)]
pub struct CountingSnapshotStore {
    snapshot: Arc<Mutex<Option<Snapshot>>>,
    corrupt: Arc<AtomicBool>,
    load_count: Arc<AtomicUsize>,
    save_count: Arc<AtomicUsize>,
}

impl CountingSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::default();
        *store.snapshot.lock().unwrap() = Some(snapshot);
        store
    }

    /// Make load() fail as if the file were unreadable
    pub fn corrupted() -> Self {
        let store = Self::default();
        store.corrupt.store(true, Ordering::SeqCst);
        store
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.snapshot.lock().unwrap().clone()
    }

    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SnapshotStore for CountingSnapshotStore {
    async fn load(&self) -> Result<Option<Snapshot>> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        if self.corrupt.load(Ordering::SeqCst) {
            return Err(Error::state_read("expected value at line 1 column 1"));
        }
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.save_count.fetch_add(1, Ordering::SeqCst);
        self.corrupt.store(false, Ordering::SeqCst);
        *self.snapshot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }
}

/// Helper to create a WatchConfig with a fixed horizon and no retry delay
pub fn minimal_config(end: NaiveDate) -> WatchConfig {
    let mut config = WatchConfig::new(end);
    config.engine = EngineConfig {
        max_retries: 2,
        retry_delay_secs: 0,
        max_pages: 5,
        event_channel_capacity: 100,
        dry_run: false,
    };
    config
}

/// A calendar page in the shape the booking site renders
pub const DECEMBER_PAGE: &str = "
    Overland Track
    Availability
    Saturday 6 Dec 2025 025
    Available
    1 Available

    Sunday 7 Dec 2025 025
    Fully Booked
    Monday 8 Dec 2025 025
    Fully Booked
    2 Available
    Tuesday 9 Dec 2025 025
    Available
    4 Available
    Next
";
