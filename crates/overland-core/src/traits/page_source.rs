// # Page Source Trait
//
// Defines the interface for fetching the availability calendar.
//
// ## Implementations
//
// - HTTP + HTML: `overland-page-http` crate
// - Scripted pages: `tests/common` in this crate
//
// ## Usage
//
// ```rust,ignore
// use overland_core::PageSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* PageSource implementation */;
//
//     // First page has no cursor
//     let lines = source.fetch_lines(None).await?;
//     println!("{} lines", lines.len());
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use chrono::NaiveDate;

/// Trait for calendar page sources
///
/// A source performs one request per call and turns the response into the
/// ordered, trimmed, non-empty lines consumed by the segmenter. Line order
/// must follow visual document order.
///
/// Sources do not retry; `WatchEngine` owns the retry policy. Any
/// non-success response must be returned as `Error::Fetch` so no partial
/// page is ever merged.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page of the calendar
    ///
    /// # Parameters
    ///
    /// - `cursor`: `None` for the first page, otherwise the first date the
    ///   next page should start from
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<String>)`: Normalized lines of the page
    /// - `Err(Error::Fetch)`: Transport failure or non-success status
    async fn fetch_lines(&self, cursor: Option<NaiveDate>) -> Result<Vec<String>, crate::Error>;

    /// Whether the source honours a cursor
    ///
    /// The engine fetches a single page from sources that don't.
    fn supports_pagination(&self) -> bool {
        false
    }

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}

/// Split text into trimmed, non-empty lines, keeping their order
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
