//! Date-block segmentation
//!
//! A header line names a weekday, a 1-2 digit day, a three-letter month and
//! a four-digit year (`Saturday 6 Dec 2025`). Each header opens a block that
//! runs up to the next header or the end of input. Lines before the first
//! header belong to no day and are dropped.

use std::sync::LazyLock;

use regex::Regex;

pub(crate) static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)\s+(\d{1,2})\s+([A-Za-z]{3})\s+(\d{4})",
    )
    .unwrap()
});

/// Contiguous lines belonging to one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    lines: &'a [String],
}

impl<'a> Block<'a> {
    /// The header line that opened this block
    pub fn header(&self) -> &'a str {
        &self.lines[0]
    }

    /// Follow-on lines after the header, in page order
    pub fn body(&self) -> &'a [String] {
        &self.lines[1..]
    }

    /// All lines including the header
    pub fn lines(&self) -> &'a [String] {
        self.lines
    }
}

/// Whether `line` opens a new calendar day
pub fn is_header(line: &str) -> bool {
    HEADER_RE.is_match(line)
}

/// Partition `lines` into one block per header line
///
/// Blocks cover every line from the first header to the end of input
/// without overlap. No headers means no blocks.
pub fn segment(lines: &[String]) -> Vec<Block<'_>> {
    let starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_header(line))
        .map(|(i, _)| i)
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(k, &start)| {
            let end = starts.get(k + 1).copied().unwrap_or(lines.len());
            Block {
                lines: &lines[start..end],
            }
        })
        .collect()
}
