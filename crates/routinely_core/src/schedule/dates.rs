//! Calendar date sequencing.
//!
//! # Invariants
//! - Element `i` is exactly `start + i` calendar days.
//! - Sequences carry no shared cursor; a clone restarts from the same position.
//! - Arithmetic is on `NaiveDate`, so DST and time zones cannot shift a day.

use chrono::{Days, NaiveDate};

/// Finite, restartable run of consecutive calendar dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSequence {
    start: NaiveDate,
    count: usize,
    offset: usize,
}

/// Returns `count` consecutive dates beginning at `start`.
pub fn sequence(start: NaiveDate, count: usize) -> DateSequence {
    DateSequence {
        start,
        count,
        offset: 0,
    }
}

impl Iterator for DateSequence {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.count {
            return None;
        }
        // Ends early instead of wrapping when past chrono's max date.
        let date = self
            .start
            .checked_add_days(Days::new(self.offset as u64))?;
        self.offset += 1;
        Some(date)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.count - self.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::sequence;
    use chrono::NaiveDate;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn rolls_over_month_and_leap_day() {
        let dates: Vec<_> = sequence(ymd(2024, 2, 28), 3).collect();
        assert_eq!(dates, vec![ymd(2024, 2, 28), ymd(2024, 2, 29), ymd(2024, 3, 1)]);

        let dates: Vec<_> = sequence(ymd(2023, 1, 31), 2).collect();
        assert_eq!(dates[1], ymd(2023, 2, 1));
    }

    #[test]
    fn rolls_over_year_boundary() {
        let dates: Vec<_> = sequence(ymd(2024, 12, 31), 2).collect();
        assert_eq!(dates, vec![ymd(2024, 12, 31), ymd(2025, 1, 1)]);
    }

    #[test]
    fn zero_count_is_empty() {
        assert_eq!(sequence(ymd(2024, 6, 1), 0).count(), 0);
    }

    #[test]
    fn clone_restarts_independently() {
        let mut original = sequence(ymd(2024, 3, 30), 4);
        let restart = original.clone();
        assert_eq!(original.next(), Some(ymd(2024, 3, 30)));
        assert_eq!(original.next(), Some(ymd(2024, 3, 31)));

        let replay: Vec<_> = restart.collect();
        assert_eq!(replay.len(), 4);
        assert_eq!(replay[0], ymd(2024, 3, 30));
        assert_eq!(replay[3], ymd(2024, 4, 2));
    }

    #[test]
    fn stops_at_calendar_end_instead_of_wrapping() {
        let dates: Vec<_> = sequence(NaiveDate::MAX, 3).collect();
        assert_eq!(dates, vec![NaiveDate::MAX]);
    }
}
