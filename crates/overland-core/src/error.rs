//! Error types for the Overland watcher
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for watcher operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the Overland watcher
#[derive(Error, Debug)]
pub enum Error {
    /// Page fetch failed (network, transport, non-success status)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// A header line matched the date pattern but is not a calendar date
    #[error("Malformed date: {0}")]
    MalformedDate(String),

    /// Persisted snapshot could not be read or parsed
    #[error("State read error: {0}")]
    StateRead(String),

    /// Persisted snapshot could not be written
    #[error("State write error: {0}")]
    StateWrite(String),

    /// Notifier rejected or failed to deliver the alert
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a malformed date error
    pub fn malformed_date(msg: impl Into<String>) -> Self {
        Self::MalformedDate(msg.into())
    }

    /// Create a state read error
    pub fn state_read(msg: impl Into<String>) -> Self {
        Self::StateRead(msg.into())
    }

    /// Create a state write error
    pub fn state_write(msg: impl Into<String>) -> Self {
        Self::StateWrite(msg.into())
    }

    /// Create a delivery error
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
