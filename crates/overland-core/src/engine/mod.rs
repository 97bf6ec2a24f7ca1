//! Watch engine
//!
//! The WatchEngine performs one run:
//! - Fetching calendar pages via PageSource (with retries and pagination)
//! - Extracting and merging per-date records
//! - Filtering them to the active window
//! - Deciding against the persisted snapshot
//! - Notifying, then persisting the new snapshot
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ PageSource  │─── lines ───┐
//! └─────────────┘             │
//!                             ▼
//!                    ┌──────────────┐
//!                    │ WatchEngine  │── segment / extract / window
//!                    └──────────────┘
//!                             │
//!         ┌───────────────────┼───────────────────┐
//!         │                   │                   │
//!         ▼                   ▼                   ▼
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ StateDiffer │     │   Notifier   │     │   Events    │
//! │ (decide)    │     │   (send)     │     │  (monitor)  │
//! └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. Fetch pages until no new dates, the horizon, or the page limit
//! 2. Load the previous snapshot (unreadable = absent)
//! 3. Decide
//! 4. Send the alert, if the decision has one
//! 5. On success, persist the snapshot, if the decision requires it
//!
//! A fetch failure aborts before step 2, so state is never touched. A
//! delivery failure aborts before step 5, so the same change is announced
//! again on the next run.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::availability::{AvailabilityWindow, DateRecord, extract_lines, interesting};
use crate::config::{WatchConfig, WindowConfig};
use crate::diff::{NotificationDecision, StateDiffer, decide};
use crate::error::{Error, Result};
use crate::message;
use crate::traits::{Notifier, PageSource, SnapshotStore};

/// Events emitted by the WatchEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Run started
    Started {
        window_start: NaiveDate,
        window_end: NaiveDate,
    },

    /// Page fetch attempt failed
    FetchFailed {
        page: usize,
        attempt: usize,
        error: String,
    },

    /// Page fetched and merged
    PageFetched {
        page: usize,
        lines: usize,
        new_dates: usize,
    },

    /// Decision computed
    DecisionMade {
        decision: &'static str,
        interesting: usize,
    },

    /// Alert delivered
    NotificationSent { notifier: &'static str },

    /// Alert delivery failed
    NotificationFailed {
        notifier: &'static str,
        error: String,
    },

    /// Snapshot replaced
    SnapshotWritten { entries: usize },
}

/// Summary of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Window the run filtered against
    pub window: AvailabilityWindow,
    /// Pages fetched
    pub pages_fetched: usize,
    /// Distinct dates extracted across all pages
    pub records_extracted: usize,
    /// Header lines skipped because their date failed to parse
    pub headers_skipped: usize,
    /// Records inside the window that are available
    pub interesting: Vec<DateRecord>,
    /// Decision for this run
    pub decision: NotificationDecision,
    /// Whether an alert was delivered
    pub notified: bool,
    /// Whether the snapshot was replaced
    pub snapshot_written: bool,
}

/// Records merged across all fetched pages
struct Collected {
    records: BTreeMap<NaiveDate, DateRecord>,
    pages: usize,
    skipped: usize,
}

/// Core watch engine
///
/// ## Lifecycle
///
/// 1. Create with [`WatchEngine::new()`]
/// 2. Call [`WatchEngine::run()`] once per scheduled invocation
///
/// ## Concurrency
///
/// One run at a time. The snapshot is not locked against other processes.
pub struct WatchEngine {
    /// Calendar page source
    source: Box<dyn PageSource>,

    /// Alert delivery
    notifier: Box<dyn Notifier>,

    /// Sole owner of the snapshot store
    differ: StateDiffer,

    /// Window settings, resolved per run
    window: WindowConfig,

    /// Maximum retry attempts per page
    max_retries: usize,

    /// Delay between retries (in seconds)
    retry_delay_secs: u64,

    /// Page limit per run
    max_pages: usize,

    /// Skip sending and persisting
    dry_run: bool,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl WatchEngine {
    /// Create a new watch engine
    ///
    /// # Parameters
    ///
    /// - `source`: Page source implementation
    /// - `notifier`: Notifier implementation
    /// - `store`: Snapshot store implementation
    /// - `config`: Watcher configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        source: Box<dyn PageSource>,
        notifier: Box<dyn Notifier>,
        store: Box<dyn SnapshotStore>,
        config: WatchConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            source,
            notifier,
            differ: StateDiffer::new(store),
            window: config.window,
            max_retries: config.engine.max_retries,
            retry_delay_secs: config.engine.retry_delay_secs,
            max_pages: config.engine.max_pages,
            dry_run: config.engine.dry_run,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run once, with the window starting today (local time)
    pub async fn run(&self) -> Result<RunReport> {
        self.run_at(chrono::Local::now().date_naive()).await
    }

    /// Run once as if today were `today`
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: The run completed, whatever the decision
    /// - `Err(Error::Fetch)`: No page text; state untouched
    /// - `Err(Error::Delivery)`: Alert not delivered; snapshot kept
    /// - `Err(Error::StateWrite)`: Alert delivered but snapshot not replaced
    pub async fn run_at(&self, today: NaiveDate) -> Result<RunReport> {
        let window = self.window.resolve(today)?;
        info!("Checking availability {} – {}", window.start(), window.end());
        self.emit_event(EngineEvent::Started {
            window_start: window.start(),
            window_end: window.end(),
        });

        let collected = self.collect(&window).await?;
        let current = interesting(collected.records.values(), &window);
        info!(
            "{} dates extracted from {} page(s), {} of interest",
            collected.records.len(),
            collected.pages,
            current.len()
        );

        let previous = self.differ.previous().await;
        let decision = decide(previous.as_ref(), &current);
        info!("Decision: {}", decision.label());
        self.emit_event(EngineEvent::DecisionMade {
            decision: decision.label(),
            interesting: current.len(),
        });

        let mut report = RunReport {
            window,
            pages_fetched: collected.pages,
            records_extracted: collected.records.len(),
            headers_skipped: collected.skipped,
            interesting: current,
            decision,
            notified: false,
            snapshot_written: false,
        };

        let alert = message::render(&report.decision, &window);

        if self.dry_run {
            match alert {
                Some(text) => info!("Dry run, not sending:\n{}", text),
                None => info!("Dry run, nothing to send"),
            }
            return Ok(report);
        }

        if let Some(text) = alert {
            self.deliver(&text).await?;
            report.notified = true;
        }

        if report.decision.should_persist() {
            self.differ.commit(&report.interesting).await?;
            report.snapshot_written = true;
            self.emit_event(EngineEvent::SnapshotWritten {
                entries: report.interesting.len(),
            });
        }

        Ok(report)
    }

    /// Fetch and merge pages
    ///
    /// Stops when a page adds no new dates, the latest date seen reaches the
    /// horizon, the page limit is hit, or the source does not paginate.
    async fn collect(&self, window: &AvailabilityWindow) -> Result<Collected> {
        let mut collected = Collected {
            records: BTreeMap::new(),
            pages: 0,
            skipped: 0,
        };
        let mut cursor = None;

        loop {
            let page = collected.pages + 1;
            let lines = self.fetch_with_retry(page, cursor).await?;

            let extraction = extract_lines(&lines);
            collected.skipped += extraction.skipped;
            let new_dates = extraction.merge_into(&mut collected.records);
            collected.pages = page;

            debug!(
                "Page {}: {} lines, {} new dates",
                page,
                lines.len(),
                new_dates
            );
            self.emit_event(EngineEvent::PageFetched {
                page,
                lines: lines.len(),
                new_dates,
            });

            if !self.source.supports_pagination() {
                break;
            }
            if new_dates == 0 {
                debug!("Page {} added no new dates, stopping", page);
                break;
            }
            let Some(&latest) = collected.records.keys().next_back() else {
                break;
            };
            if latest >= window.end() {
                debug!("Reached horizon {} at page {}", window.end(), page);
                break;
            }
            if page >= self.max_pages {
                warn!(
                    "Page limit {} reached before horizon (latest date {})",
                    self.max_pages, latest
                );
                break;
            }
            cursor = latest.succ_opt();
            if cursor.is_none() {
                break;
            }
        }

        Ok(collected)
    }

    /// Fetch one page with retry logic
    ///
    /// # Parameters
    ///
    /// - `page`: 1-based page number (for logs)
    /// - `cursor`: Cursor passed to the source
    async fn fetch_with_retry(&self, page: usize, cursor: Option<NaiveDate>) -> Result<Vec<String>> {
        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            match self.source.fetch_lines(cursor).await {
                Ok(lines) => return Ok(lines),
                Err(e) => {
                    warn!(
                        "Fetch attempt {} failed for page {} ({}): {}",
                        attempt,
                        page,
                        self.source.source_name(),
                        e
                    );
                    self.emit_event(EngineEvent::FetchFailed {
                        page,
                        attempt,
                        error: e.to_string(),
                    });
                    last_error = Some(e);

                    // Wait before retry (unless this was the last attempt)
                    if attempt < self.max_retries {
                        tokio::time::sleep(tokio::time::Duration::from_secs(self.retry_delay_secs))
                            .await;
                    }
                }
            }
        }

        // All retries failed
        let error = last_error.unwrap_or_else(|| Error::fetch("Unknown fetch error"));
        error!("Giving up on page {}: {}", page, error);
        Err(match error {
            Error::Fetch(_) => error,
            other => Error::fetch(other.to_string()),
        })
    }

    /// Send the alert, mapping any failure to a delivery error
    async fn deliver(&self, text: &str) -> Result<()> {
        let notifier = self.notifier.notifier_name();
        match self.notifier.send(text).await {
            Ok(()) => {
                info!("Alert sent via {}", notifier);
                self.emit_event(EngineEvent::NotificationSent { notifier });
                Ok(())
            }
            Err(e) => {
                error!("Alert delivery via {} failed, keeping old snapshot: {}", notifier, e);
                self.emit_event(EngineEvent::NotificationFailed {
                    notifier,
                    error: e.to_string(),
                });
                Err(match e {
                    Error::Delivery(_) => e,
                    other => Error::delivery(other.to_string()),
                })
            }
        }
    }

    /// Emit an engine event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            // Full or closed; monitoring is best-effort
            debug!("Event channel unavailable, dropping event");
        }
    }
}
