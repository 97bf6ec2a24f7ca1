// # HTTP Page Source
//
// Fetches the booking calendar over HTTP and flattens its HTML into the
// text lines the segmenter works on.
//
// ## Text extraction
//
// Every text node becomes its own line, in document order. Text inside
// `<script>`, `<style>`, `<noscript>` and `<template>` is dropped. Lines are then
// trimmed and blank ones removed.
//
// ## Pagination
//
// When `page_param` is configured, a cursor date is sent as
// `?<page_param>=YYYY-MM-DD`. Without it the source serves a single page
// and the engine never asks for a second one.
//
// ## Constraints
//
// - One request per call; retries are owned by `WatchEngine`
// - Any non-success status is `Error::Fetch`, never a partial page

use async_trait::async_trait;
use chrono::NaiveDate;
use overland_core::config::SourceConfig;
use overland_core::traits::{PageSource, normalize_lines};
use overland_core::{Error, Result};
use scraper::Html;
use std::time::Duration;

/// Elements whose text never reaches the page
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// HTTP calendar page source
#[derive(Debug)]
pub struct HttpPageSource {
    /// Calendar URL
    url: String,

    /// Cursor query parameter, if the site paginates
    page_param: Option<String>,

    /// HTTP client (timeout and user agent preset)
    client: reqwest::Client,
}

impl HttpPageSource {
    /// Create a new HTTP page source
    ///
    /// # Errors
    ///
    /// `Error::Config` if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url.clone(),
            page_param: config.page_param.clone(),
            client,
        })
    }

    /// Fetch the raw HTML of one page
    async fn fetch_html(&self, cursor: Option<NaiveDate>) -> Result<String> {
        let mut request = self.client.get(&self.url);
        if let (Some(param), Some(cursor)) = (&self.page_param, cursor) {
            request = request.query(&[(param.as_str(), cursor.format("%Y-%m-%d").to_string())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::fetch(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::fetch(format!("HTTP error: {}", response.status())));
        }

        response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("Failed to read response: {}", e)))
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_lines(&self, cursor: Option<NaiveDate>) -> Result<Vec<String>> {
        let html = self.fetch_html(cursor).await?;
        let lines = html_to_lines(&html);
        tracing::debug!(
            "Fetched {} ({} bytes, {} lines, cursor={:?})",
            self.url,
            html.len(),
            lines.len(),
            cursor
        );
        Ok(lines)
    }

    fn supports_pagination(&self) -> bool {
        self.page_param.is_some()
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// Flatten an HTML document into trimmed, non-empty text lines
///
/// Each text node starts a new line, so `<td>Sat 6 Dec</td><td>Available</td>`
/// yields two lines. Text inside hidden elements is skipped.
pub fn html_to_lines(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let mut text = String::new();
    for node in document.root_element().descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| e.name()))
            .is_some_and(|name| HIDDEN_ELEMENTS.contains(&name));
        if hidden {
            continue;
        }
        text.push_str(fragment);
        text.push('\n');
    }

    normalize_lines(&text)
}
