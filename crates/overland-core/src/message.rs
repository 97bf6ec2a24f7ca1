//! Alert text rendering
//!
//! Turns a [`NotificationDecision`] into the single text payload handed to a
//! [`Notifier`](crate::Notifier).

use crate::availability::{AvailabilityWindow, DateRecord};
use crate::diff::NotificationDecision;

const AVAILABLE_HEADING: &str = "🚨 Overland Track availability found!";
const GONE_HEADING: &str = "Overland Track availability is gone.";

/// Render the alert for `decision`
///
/// # Returns
///
/// `None` for silent decisions (`Unchanged`, first run with nothing available)
pub fn render(decision: &NotificationDecision, window: &AvailabilityWindow) -> Option<String> {
    if !decision.should_notify() {
        return None;
    }

    let mut lines = Vec::new();
    match decision {
        NotificationDecision::ChangedToNone => {
            lines.push(GONE_HEADING.to_string());
            lines.push(window_line(window));
        }
        _ => {
            lines.push(AVAILABLE_HEADING.to_string());
            lines.push(window_line(window));
            lines.push(String::new());
            lines.extend(decision.records().iter().map(record_line));
        }
    }

    Some(lines.join("\n"))
}

fn window_line(window: &AvailabilityWindow) -> String {
    format!(
        "Window: {} – {}",
        window.start().format("%d %b %Y"),
        window.end().format("%d %b %Y")
    )
}

fn record_line(record: &DateRecord) -> String {
    let date = record.date.format("%A %d %b %Y");
    match record.spots {
        Some(1) => format!("- {}: 1 spot", date),
        Some(n) => format!("- {}: {} spots", date, n),
        None => format!("- {}: available", date),
    }
}
