//! Availability calendar parsing
//!
//! Turns the normalized text lines of one calendar page into per-date
//! records and selects the records worth reporting:
//!
//! ```text
//! lines ──► segment ──► blocks ──► extract ──► DateRecord* ──► window ──► interesting
//! ```
//!
//! - [`segment`]: splits lines into one block per calendar day
//! - [`extract`]: derives a [`DateRecord`] from one block
//! - [`window`]: keeps available records inside an [`AvailabilityWindow`]

pub mod extract;
pub mod segment;
pub mod window;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use extract::{Extraction, extract_lines, extract_record, parse_header_date};
pub use segment::{Block, is_header, segment};
pub use window::interesting;

/// Booking status observed for a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// The block carried an "Available" token
    Available,
    /// The block carried a "Fully Booked" token
    FullyBooked,
    /// No recognizable status token in the block
    Unknown,
}

/// One calendar day's observed booking status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRecord {
    /// Calendar date of the block header
    pub date: NaiveDate,
    /// Status derived from the block (first match wins)
    pub status: BookingStatus,
    /// Remaining spots, if the block states a count (last match wins)
    pub spots: Option<u32>,
}

impl DateRecord {
    /// Create a new record
    pub fn new(date: NaiveDate, status: BookingStatus, spots: Option<u32>) -> Self {
        Self { date, status, spots }
    }

    /// Whether the record counts as bookable
    ///
    /// `FullyBooked` and `Unknown` never qualify, whatever count was seen.
    pub fn is_available(&self) -> bool {
        self.status == BookingStatus::Available && self.spots.is_none_or(|n| n > 0)
    }
}

/// Inclusive `[start, end]` date window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl AvailabilityWindow {
    /// Create a window, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::config(format!(
                "Window start {} is after window end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// First date in the window
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date in the window (the configured horizon)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` lies inside the window
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
