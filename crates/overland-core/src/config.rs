//! Configuration types for the Overland watcher
//!
//! This module defines all configuration structures used throughout the crate.
//! Nothing here is read from process-wide state: the binary builds a
//! [`WatchConfig`] and passes it to the engine, so tests can inject any window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default calendar page
pub const DEFAULT_URL: &str =
    "https://azapps.customlinc.com.au/tasparksoverland/BookingCat/Availability/?Category=OVERLAND";

/// Default user agent for page requests
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; OverlandChecker/1.0)";

/// Main watcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Calendar source configuration
    pub source: SourceConfig,

    /// Date window to watch
    pub window: WindowConfig,

    /// Notifier configuration
    pub notifier: NotifierConfig,

    /// Snapshot store configuration
    #[serde(default)]
    pub state_store: StateStoreConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl WatchConfig {
    /// Create a configuration with defaults for everything but the horizon
    pub fn new(end: NaiveDate) -> Self {
        Self {
            source: SourceConfig::default(),
            window: WindowConfig { start: None, end },
            notifier: NotifierConfig::Log,
            state_store: StateStoreConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.source.validate()?;
        self.window.validate()?;
        self.notifier.validate()?;
        self.state_store.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// Calendar source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Calendar page URL
    pub url: String,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Query parameter carrying the pagination cursor (`YYYY-MM-DD`)
    ///
    /// `None` disables pagination: a single page is fetched per run.
    #[serde(default)]
    pub page_param: Option<String>,
}

impl SourceConfig {
    /// Validate the source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.url.is_empty() {
            return Err(crate::Error::config("Source URL cannot be empty"));
        }
        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "Source URL must use HTTP or HTTPS scheme. Got: {}",
                self.url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Source timeout must be > 0"));
        }
        if self.page_param.as_ref().is_some_and(|p| p.is_empty()) {
            return Err(crate::Error::config("Page parameter cannot be empty"));
        }
        Ok(())
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            page_param: None,
        }
    }
}

/// Date window configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Earliest date of interest; the run date is used when this is earlier or unset
    #[serde(default)]
    pub start: Option<NaiveDate>,

    /// Fixed horizon (inclusive)
    pub end: NaiveDate,
}

impl WindowConfig {
    /// Validate the window configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if let Some(start) = self.start
            && start > self.end
        {
            return Err(crate::Error::config(format!(
                "Window start {} is after window end {}",
                start, self.end
            )));
        }
        Ok(())
    }

    /// Effective window for a run on `today`
    pub fn resolve(&self, today: NaiveDate) -> Result<crate::AvailabilityWindow, crate::Error> {
        let start = self.start.map_or(today, |start| start.max(today));
        crate::AvailabilityWindow::new(start, self.end)
    }
}

/// Notifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifierConfig {
    /// Telegram Bot API
    Telegram {
        /// Bot token
        bot_token: String,
        /// Destination chat ID
        chat_id: String,
    },

    /// Log the alert instead of sending it
    Log,
}

impl NotifierConfig {
    /// Validate the notifier configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            NotifierConfig::Telegram { bot_token, chat_id } => {
                if bot_token.is_empty() {
                    return Err(crate::Error::config("Telegram bot token cannot be empty"));
                }
                if chat_id.is_empty() {
                    return Err(crate::Error::config("Telegram chat ID cannot be empty"));
                }
                Ok(())
            }
            NotifierConfig::Log => Ok(()),
        }
    }

    /// Get the notifier type name
    pub fn type_name(&self) -> &'static str {
        match self {
            NotifierConfig::Telegram { .. } => "telegram",
            NotifierConfig::Log => "log",
        }
    }
}

/// Snapshot store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateStoreConfig {
    /// File-based snapshot store
    File {
        /// Path to the state file
        path: String,
    },

    /// In-memory snapshot store (not persistent)
    #[default]
    Memory,
}

impl StateStoreConfig {
    /// Validate the snapshot store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StateStoreConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("State file path cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Additional fetch attempts per page after the first failure
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Delay between fetch attempts (in seconds)
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Upper bound on pages fetched per run
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Compute and log the decision without sending or persisting
    #[serde(default)]
    pub dry_run: bool,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.max_pages == 0 {
            return Err(crate::Error::config("max_pages must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event_channel_capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            max_pages: default_max_pages(),
            event_channel_capacity: default_event_channel_capacity(),
            dry_run: false,
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_max_pages() -> usize {
    12
}

fn default_event_channel_capacity() -> usize {
    64
}
