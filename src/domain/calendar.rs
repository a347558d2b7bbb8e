//! Calendar-day helpers.
//!
//! A calendar day is a [`NaiveDate`]: the wall-clock date with the time of day
//! truncated. Agendas are keyed by calendar day, so two timestamps belong to the
//! same agenda exactly when their calendar days are equal.

use std::iter::FusedIterator;

use chrono::{NaiveDate, NaiveDateTime};

/// Anything that can be truncated to the calendar day it falls on.
pub trait StartOfDay: Copy {
    /// The calendar day containing this value.
    fn start_of_day(self) -> NaiveDate;
}

impl StartOfDay for NaiveDate {
    fn start_of_day(self) -> NaiveDate {
        self
    }
}

impl StartOfDay for NaiveDateTime {
    fn start_of_day(self) -> NaiveDate {
        self.date()
    }
}

/// Truncates a timestamp (or date) to its calendar day.
#[must_use]
pub fn start_of_day<T: StartOfDay>(value: T) -> NaiveDate {
    value.start_of_day()
}

/// Returns every calendar day from `start` through `end`, inclusive.
///
/// Both bounds are truncated to their calendar day first. The sequence always
/// contains at least `start`, so `start == end` yields one day and an inverted
/// range (`end < start`) yields only `start`.
///
/// The returned iterator is lazy and can be cloned to restart it.
#[must_use]
pub fn days_in_range<S: StartOfDay, E: StartOfDay>(start: S, end: E) -> DaysInRange {
    DaysInRange {
        next: Some(start.start_of_day()),
        last: end.start_of_day(),
    }
}

/// Iterator over consecutive calendar days.
///
/// Created by [`days_in_range`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaysInRange {
    next: Option<NaiveDate>,
    last: NaiveDate,
}

impl Iterator for DaysInRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current < self.last {
            current.succ_opt()
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            None => 0,
            Some(next) if next >= self.last => 1,
            Some(next) => {
                usize::try_from((self.last - next).num_days()).map_or(usize::MAX, |n| n + 1)
            }
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DaysInRange {}

impl FusedIterator for DaysInRange {}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use test_case::test_case;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn start_of_day_truncates_time() {
        let ts = date(2025, 6, 1).and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(start_of_day(ts), date(2025, 6, 1));
    }

    #[test]
    fn equal_bounds_yield_one_day() {
        let days: Vec<_> = days_in_range(date(2025, 6, 1), date(2025, 6, 1)).collect();
        assert_eq!(days, vec![date(2025, 6, 1)]);
    }

    #[test]
    fn three_day_span_yields_four_days_in_order() {
        let start = date(2025, 6, 1);
        let end = start + chrono::Days::new(3);
        let days: Vec<_> = days_in_range(start, end).collect();
        assert_eq!(
            days,
            vec![
                date(2025, 6, 1),
                date(2025, 6, 2),
                date(2025, 6, 3),
                date(2025, 6, 4)
            ]
        );
    }

    #[test]
    fn timestamps_are_truncated_before_stepping() {
        let start = date(2025, 6, 1).and_time(NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        let end = date(2025, 6, 2).and_time(NaiveTime::from_hms_opt(6, 0, 0).unwrap());
        let days: Vec<_> = days_in_range(start, end).collect();
        assert_eq!(days, vec![date(2025, 6, 1), date(2025, 6, 2)]);
    }

    #[test]
    fn inverted_range_yields_start_only() {
        let days: Vec<_> = days_in_range(date(2025, 6, 5), date(2025, 6, 1)).collect();
        assert_eq!(days, vec![date(2025, 6, 5)]);
    }

    #[test]
    fn iterator_can_be_restarted_by_cloning() {
        let range = days_in_range(date(2025, 12, 30), date(2026, 1, 2));
        let first: Vec<_> = range.clone().collect();
        let second: Vec<_> = range.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test_case(1, 1, 1; "single day")]
    #[test_case(1, 7, 7; "one week")]
    #[test_case(28, 3, 4; "across month end")]
    fn size_hint_matches_length(start_day: u32, end_day: u32, expected: usize) {
        let start = date(2025, 2, start_day);
        let end = if end_day < start_day {
            date(2025, 3, end_day)
        } else {
            date(2025, 2, end_day)
        };
        let range = days_in_range(start, end);
        assert_eq!(range.len(), expected);
        assert_eq!(range.count(), expected);
    }
}
