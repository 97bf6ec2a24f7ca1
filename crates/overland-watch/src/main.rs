// # overland-watch
//
// One-shot availability watcher, meant to be run on a schedule (cron,
// systemd timer, CI job). Each invocation performs exactly one run:
//
// 1. Read configuration from environment variables
// 2. Initialize logging and the tokio runtime
// 3. Wire the page source, notifier and snapshot store
// 4. Run the engine once and exit with a status code
//
// All watcher logic lives in overland-core; this binary only wires it up.
//
// ## Configuration
//
// ### Calendar
// - `OVERLAND_URL`: Calendar page URL (default: the Overland Track booking page)
// - `OVERLAND_USER_AGENT`: User agent for page requests
// - `OVERLAND_TIMEOUT_SECS`: Request timeout in seconds (default 30)
// - `OVERLAND_PAGE_PARAM`: Query parameter for the pagination cursor (unset = single page)
//
// ### Window
// - `OVERLAND_WINDOW_START`: First date of interest, `YYYY-MM-DD` (default today)
// - `OVERLAND_WINDOW_END`: Last date of interest, `YYYY-MM-DD` (required)
//
// ### Notifier
// - `OVERLAND_NOTIFIER`: `telegram` (default) or `log`
// - `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`: Telegram credentials
//
// ### State
// - `OVERLAND_STATE_PATH`: Snapshot file (unset = in-memory, every run is a first run)
//
// ### Engine
// - `OVERLAND_MAX_RETRIES`: Extra fetch attempts per page (default 3)
// - `OVERLAND_RETRY_DELAY_SECS`: Delay between attempts (default 5)
// - `OVERLAND_MAX_PAGES`: Page limit per run (default 12)
// - `OVERLAND_MODE`: `run` (default), `dry-run` or `test-notify`
// - `OVERLAND_LOG_LEVEL`: trace, debug, info (default), warn, error
//
// ## Example
//
// ```bash
// export OVERLAND_WINDOW_START=2026-01-01
// export OVERLAND_WINDOW_END=2026-04-15
// export TELEGRAM_BOT_TOKEN=123456:abc
// export TELEGRAM_CHAT_ID=42
// export OVERLAND_STATE_PATH=/var/lib/overland/state.json
//
// overland-watch
// ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use overland_core::config::{
    EngineConfig, NotifierConfig, SourceConfig, StateStoreConfig, WatchConfig, WindowConfig,
};
use overland_core::traits::{Notifier, SnapshotStore};
use overland_core::{FileSnapshotStore, LogNotifier, MemorySnapshotStore, WatchEngine};
use overland_notify_telegram::TelegramNotifier;
use overland_page_http::HttpPageSource;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Message sent by `OVERLAND_MODE=test-notify`
const TEST_MESSAGE: &str = "✅ Test message from overland-watch";

/// Exit codes for different termination scenarios
///
/// - 0: Run completed (whatever the decision)
/// - 1: Configuration error
/// - 2: Runtime error (fetch, delivery, state write)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchExitCode {
    /// Run completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<WatchExitCode> for ExitCode {
    fn from(code: WatchExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// What this invocation does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Full run: fetch, decide, notify, persist
    Run,
    /// Fetch and decide, log the alert, touch nothing
    DryRun,
    /// Send a fixed message through the notifier and exit
    TestNotify,
}

/// Application configuration
#[derive(Debug)]
struct Config {
    watch: WatchConfig,
    mode: Mode,
    log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`; blank values count as unset
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mode = match var("OVERLAND_MODE").as_deref() {
            None | Some("run") => Mode::Run,
            Some("dry-run") => Mode::DryRun,
            Some("test-notify") => Mode::TestNotify,
            Some(other) => anyhow::bail!(
                "OVERLAND_MODE '{}' is not valid. Valid modes: run, dry-run, test-notify",
                other
            ),
        };

        let log_level = match var("OVERLAND_LOG_LEVEL")
            .map(|l| l.to_lowercase())
            .as_deref()
        {
            Some("trace") => Level::TRACE,
            Some("debug") => Level::DEBUG,
            None | Some("info") => Level::INFO,
            Some("warn") => Level::WARN,
            Some("error") => Level::ERROR,
            Some(other) => anyhow::bail!(
                "OVERLAND_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        };

        let notifier = match var("OVERLAND_NOTIFIER").as_deref() {
            None | Some("telegram") => NotifierConfig::Telegram {
                bot_token: var("TELEGRAM_BOT_TOKEN").context(
                    "TELEGRAM_BOT_TOKEN is required for the telegram notifier. \
                    Set OVERLAND_NOTIFIER=log to only log alerts",
                )?,
                chat_id: var("TELEGRAM_CHAT_ID")
                    .context("TELEGRAM_CHAT_ID is required for the telegram notifier")?,
            },
            Some("log") => NotifierConfig::Log,
            Some(other) => anyhow::bail!(
                "OVERLAND_NOTIFIER '{}' is not supported. Supported notifiers: telegram, log",
                other
            ),
        };

        // test-notify never looks at the calendar
        let end = match var("OVERLAND_WINDOW_END") {
            Some(raw) => parse_date("OVERLAND_WINDOW_END", &raw)?,
            None if mode == Mode::TestNotify => NaiveDate::MAX,
            None => anyhow::bail!(
                "OVERLAND_WINDOW_END is required. \
                Set it via: export OVERLAND_WINDOW_END=2026-04-15"
            ),
        };
        let start = var("OVERLAND_WINDOW_START")
            .map(|raw| parse_date("OVERLAND_WINDOW_START", &raw))
            .transpose()?;

        let defaults = SourceConfig::default();
        let source = SourceConfig {
            url: var("OVERLAND_URL").unwrap_or(defaults.url),
            user_agent: var("OVERLAND_USER_AGENT").unwrap_or(defaults.user_agent),
            timeout_secs: parse_or("OVERLAND_TIMEOUT_SECS", var("OVERLAND_TIMEOUT_SECS"), defaults.timeout_secs)?,
            page_param: var("OVERLAND_PAGE_PARAM"),
        };

        let state_store = match var("OVERLAND_STATE_PATH") {
            Some(path) => StateStoreConfig::File { path },
            None => StateStoreConfig::Memory,
        };

        let defaults = EngineConfig::default();
        let engine = EngineConfig {
            max_retries: parse_or("OVERLAND_MAX_RETRIES", var("OVERLAND_MAX_RETRIES"), defaults.max_retries)?,
            retry_delay_secs: parse_or(
                "OVERLAND_RETRY_DELAY_SECS",
                var("OVERLAND_RETRY_DELAY_SECS"),
                defaults.retry_delay_secs,
            )?,
            max_pages: parse_or("OVERLAND_MAX_PAGES", var("OVERLAND_MAX_PAGES"), defaults.max_pages)?,
            dry_run: mode == Mode::DryRun,
            ..defaults
        };

        Ok(Self {
            watch: WatchConfig {
                source,
                window: WindowConfig { start, end },
                notifier,
                state_store,
                engine,
            },
            mode,
            log_level,
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.watch.validate()?;

        if self.watch.engine.max_retries > 10 {
            anyhow::bail!(
                "OVERLAND_MAX_RETRIES must be at most 10. Got: {}",
                self.watch.engine.max_retries
            );
        }

        if self.watch.source.url.starts_with("http://") {
            eprintln!(
                "WARNING: OVERLAND_URL uses HTTP (not HTTPS). \
                Consider using HTTPS."
            );
        }

        if let NotifierConfig::Telegram { bot_token, .. } = &self.watch.notifier
            && !bot_token.contains(':')
        {
            anyhow::bail!(
                "TELEGRAM_BOT_TOKEN does not look like a bot token \
                (expected <bot id>:<secret> as issued by @BotFather)"
            );
        }

        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` date variable
fn parse_date(key: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("{} must be a YYYY-MM-DD date. Got: {}", key, raw))
}

/// Parse an optional numeric variable, falling back to `default` when unset
fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a number. Got: {}", key, raw)),
        None => Ok(default),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return WatchExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return WatchExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return WatchExitCode::ConfigError.into();
    }

    info!("Starting overland-watch ({:?})", config.mode);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return WatchExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(config).await {
            Ok(()) => WatchExitCode::Success,
            Err(e) => {
                error!("Run failed: {:#}", e);
                exit_code_for(&e)
            }
        }
    });

    code.into()
}

/// Map a run failure to an exit code
fn exit_code_for(error: &anyhow::Error) -> WatchExitCode {
    match error.downcast_ref::<overland_core::Error>() {
        Some(overland_core::Error::Config(_)) => WatchExitCode::ConfigError,
        _ => WatchExitCode::RuntimeError,
    }
}

/// Wire collaborators and perform one run
async fn run(config: Config) -> Result<()> {
    let notifier = build_notifier(&config.watch.notifier)?;

    if config.mode == Mode::TestNotify {
        notifier.send(TEST_MESSAGE).await?;
        info!("Test message sent via {}", notifier.notifier_name());
        return Ok(());
    }

    let source = HttpPageSource::new(&config.watch.source)?;
    let store = build_store(&config.watch.state_store).await?;

    let (engine, _events) = WatchEngine::new(Box::new(source), notifier, store, config.watch)?;

    // Nothing is persisted before delivery succeeds, so an interrupted run
    // leaves the previous snapshot intact.
    let report = tokio::select! {
        report = engine.run() => report?,
        _ = tokio::signal::ctrl_c() => anyhow::bail!("Interrupted before the run completed"),
    };

    info!(
        "Run complete: {} ({} of interest, notified={}, snapshot_written={})",
        report.decision.label(),
        report.interesting.len(),
        report.notified,
        report.snapshot_written
    );
    Ok(())
}

fn build_notifier(config: &NotifierConfig) -> Result<Box<dyn Notifier>> {
    info!("Notifier: {}", config.type_name());
    Ok(match config {
        NotifierConfig::Telegram { bot_token, chat_id } => {
            Box::new(TelegramNotifier::new(bot_token.as_str(), chat_id.as_str())?)
        }
        NotifierConfig::Log => Box::new(LogNotifier),
    })
}

async fn build_store(config: &StateStoreConfig) -> Result<Box<dyn SnapshotStore>> {
    Ok(match config {
        StateStoreConfig::File { path } => {
            let store = FileSnapshotStore::new(path).await?;
            info!("Snapshot file: {}", store.path().display());
            Box::new(store)
        }
        StateStoreConfig::Memory => {
            warn!("OVERLAND_STATE_PATH not set; snapshot kept in memory, every run is a first run");
            Box::new(MemorySnapshotStore::new())
        }
    })
}
