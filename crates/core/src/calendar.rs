//! Calendar period arithmetic.
//!
//! All helpers work on `NaiveDate` with chrono's `Days`/`Months`
//! arithmetic, so none of them can fail for in-range dates.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// An inclusive date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    /// First day of the interval.
    pub start: NaiveDate,
    /// Last day of the interval.
    pub end: NaiveDate,
}

impl DateInterval {
    /// Creates an interval.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Returns true if the given date falls within this interval.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days in the interval, both ends included. Zero if inverted.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days().max(-1) + 1
    }

    /// Number of days shared with `other`, both ends included.
    #[must_use]
    pub fn overlap_days(&self, other: &Self) -> i64 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        DateInterval::new(start, end).days()
    }
}

/// First day of the month containing `date`.
#[must_use]
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// First day of the year containing `date`.
#[must_use]
pub fn year_start(date: NaiveDate) -> NaiveDate {
    month_start(date) - Months::new(date.month0())
}

/// Calendar quarter containing `date`.
#[must_use]
pub fn quarter_bounds(date: NaiveDate) -> DateInterval {
    let start = month_start(date) - Months::new(date.month0() % 3);
    let end = start + Months::new(3) - Days::new(1);
    DateInterval::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[rstest]
    #[case(d(2026, 1, 1), d(2026, 1, 1), d(2026, 3, 31))]
    #[case(d(2026, 3, 31), d(2026, 1, 1), d(2026, 3, 31))]
    #[case(d(2026, 5, 15), d(2026, 4, 1), d(2026, 6, 30))]
    #[case(d(2026, 8, 31), d(2026, 7, 1), d(2026, 9, 30))]
    #[case(d(2026, 12, 31), d(2026, 10, 1), d(2026, 12, 31))]
    fn test_quarter_bounds(
        #[case] date: NaiveDate,
        #[case] start: NaiveDate,
        #[case] end: NaiveDate,
    ) {
        assert_eq!(quarter_bounds(date), DateInterval::new(start, end));
    }

    #[test]
    fn test_month_and_year_start() {
        assert_eq!(month_start(d(2024, 2, 29)), d(2024, 2, 1));
        assert_eq!(year_start(d(2024, 11, 18)), d(2024, 1, 1));
    }

    #[test]
    fn test_interval_days_inclusive() {
        assert_eq!(DateInterval::new(d(2026, 1, 1), d(2026, 1, 1)).days(), 1);
        assert_eq!(DateInterval::new(d(2026, 1, 1), d(2026, 12, 31)).days(), 365);
        assert_eq!(DateInterval::new(d(2026, 2, 1), d(2026, 1, 1)).days(), 0);
    }

    #[test]
    fn test_overlap_days() {
        let line = DateInterval::new(d(2026, 3, 1), d(2026, 4, 30));
        let quarter = DateInterval::new(d(2026, 4, 1), d(2026, 6, 30));
        assert_eq!(line.overlap_days(&quarter), 30);

        let disjoint = DateInterval::new(d(2026, 7, 1), d(2026, 7, 31));
        assert_eq!(line.overlap_days(&disjoint), 0);
    }
}
