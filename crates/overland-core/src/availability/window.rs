//! Window filter

use super::{AvailabilityWindow, DateRecord};

/// Select the records worth reporting
///
/// Keeps records inside `window` that are available (see
/// [`DateRecord::is_available`]), sorted ascending by date.
pub fn interesting<'a, I>(records: I, window: &AvailabilityWindow) -> Vec<DateRecord>
where
    I: IntoIterator<Item = &'a DateRecord>,
{
    let mut selected: Vec<DateRecord> = records
        .into_iter()
        .filter(|record| window.contains(record.date) && record.is_available())
        .cloned()
        .collect();
    selected.sort_by_key(|record| record.date);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::BookingStatus;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_filters_window_and_status() {
        let window = AvailabilityWindow::new(ymd(2026, 1, 1), ymd(2026, 4, 15)).unwrap();
        let records = vec![
            DateRecord::new(ymd(2026, 3, 2), BookingStatus::Available, Some(4)),
            DateRecord::new(ymd(2025, 12, 6), BookingStatus::Available, Some(1)),
            DateRecord::new(ymd(2026, 1, 5), BookingStatus::Available, None),
            DateRecord::new(ymd(2026, 1, 6), BookingStatus::FullyBooked, Some(2)),
            DateRecord::new(ymd(2026, 1, 7), BookingStatus::Unknown, Some(3)),
            DateRecord::new(ymd(2026, 1, 8), BookingStatus::Available, Some(0)),
            DateRecord::new(ymd(2026, 4, 16), BookingStatus::Available, Some(6)),
        ];

        let selected = interesting(&records, &window);
        let dates: Vec<NaiveDate> = selected.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![ymd(2026, 1, 5), ymd(2026, 3, 2)]);
    }

    #[test]
    fn test_empty_input() {
        let window = AvailabilityWindow::new(ymd(2026, 1, 1), ymd(2026, 4, 15)).unwrap();
        assert!(interesting(&Vec::<DateRecord>::new(), &window).is_empty());
    }
}
