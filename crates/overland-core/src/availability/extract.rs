//! Record extraction
//!
//! Derives one [`DateRecord`] per block. Over the follow-on lines:
//! - `status`: the first line mentioning "Fully Booked" or "Available" decides it
//! - `spots`: every line of the form `<n> Available` overwrites it, so the last one wins.
//!   `<n>` is ASCII digits; counts beyond `u32::MAX` saturate
//!
//! A header whose date portion is not a real calendar date (`Monday 31 Feb 2026`)
//! is skipped with a warning.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, warn};

use super::segment::{Block, HEADER_RE, segment};
use super::{BookingStatus, DateRecord};
use crate::error::{Error, Result};

const FULLY_BOOKED: &str = "Fully Booked";
const AVAILABLE: &str = "Available";

// ASCII digits only; `\d` would also match digits `str::parse` rejects
static SPOTS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)\s+Available").unwrap());

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse the calendar date named by a header line
///
/// Month abbreviations match case-insensitively.
///
/// # Returns
///
/// - `Ok(NaiveDate)`: The header's date
/// - `Err(Error::MalformedDate)`: The line is not a header or the date does not exist
pub fn parse_header_date(line: &str) -> Result<NaiveDate> {
    let caps = HEADER_RE
        .captures(line)
        .ok_or_else(|| Error::malformed_date(format!("Not a date header: {}", line)))?;

    let day: u32 = caps[2]
        .parse()
        .map_err(|_| Error::malformed_date(format!("Invalid day in: {}", line)))?;
    let month = MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(&caps[3]))
        .ok_or_else(|| Error::malformed_date(format!("Unknown month '{}' in: {}", &caps[3], line)))?;
    let year: i32 = caps[4]
        .parse()
        .map_err(|_| Error::malformed_date(format!("Invalid year in: {}", line)))?;

    NaiveDate::from_ymd_opt(year, month as u32 + 1, day)
        .ok_or_else(|| Error::malformed_date(format!("No such calendar date: {}", line)))
}

/// Derive the record for one block
pub fn extract_record(block: &Block<'_>) -> Result<DateRecord> {
    let date = parse_header_date(block.header())?;

    let mut status = None;
    let mut spots = None;

    for line in block.body() {
        if status.is_none() {
            if line.contains(FULLY_BOOKED) {
                status = Some(BookingStatus::FullyBooked);
            } else if line.contains(AVAILABLE) {
                status = Some(BookingStatus::Available);
            }
        }

        if let Some(caps) = SPOTS_RE.captures(line) {
            // Only overflow can fail here; saturate so the line still counts
            spots = Some(caps[1].parse::<u32>().unwrap_or(u32::MAX));
        }
    }

    Ok(DateRecord {
        date,
        status: status.unwrap_or(BookingStatus::Unknown),
        spots,
    })
}

/// Result of extracting one page of lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Records in block order (a repeated date appears more than once)
    pub records: Vec<DateRecord>,
    /// Number of blocks segmented
    pub blocks: usize,
    /// Headers skipped because their date failed to parse
    pub skipped: usize,
}

impl Extraction {
    /// Merge into a dated mapping, later records overwriting earlier ones
    ///
    /// # Returns
    ///
    /// The number of dates that were not already present in `merged`
    pub fn merge_into(self, merged: &mut BTreeMap<NaiveDate, DateRecord>) -> usize {
        let mut new_dates = 0;
        for record in self.records {
            if merged.insert(record.date, record).is_none() {
                new_dates += 1;
            }
        }
        new_dates
    }
}

/// Segment `lines` and extract a record from every block
pub fn extract_lines(lines: &[String]) -> Extraction {
    let blocks = segment(lines);
    let mut extraction = Extraction {
        records: Vec::with_capacity(blocks.len()),
        blocks: blocks.len(),
        skipped: 0,
    };

    for block in &blocks {
        match extract_record(block) {
            Ok(record) => {
                debug!(
                    "Extracted {}: {:?} (spots: {:?})",
                    record.date, record.status, record.spots
                );
                extraction.records.push(record);
            }
            Err(e) => {
                warn!("Skipping block: {}", e);
                extraction.skipped += 1;
            }
        }
    }

    extraction
}
