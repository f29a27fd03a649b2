//! Inclusive calendar date ranges used by listings and analytics.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest range a single listing or report may cover.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Validation errors for [`DateRange`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateRangeError {
    /// `from` falls after `to`.
    #[error("from must not be after to")]
    Inverted,
    /// The range spans more than [`MAX_RANGE_DAYS`].
    #[error("date range must not exceed {MAX_RANGE_DAYS} days")]
    TooLong,
}

/// Inclusive range of calendar dates in UTC.
///
/// ## Invariants
/// - `from <= to`.
/// - The range covers at most [`MAX_RANGE_DAYS`] days.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use clinic_backend::domain::DateRange;
///
/// let from = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
/// let to = NaiveDate::from_ymd_opt(2026, 4, 30).unwrap();
/// let range = DateRange::new(from, to).unwrap();
/// assert!(range.contains(NaiveDate::from_ymd_opt(2026, 4, 15).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Validate and build a range.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, DateRangeError> {
        if from > to {
            return Err(DateRangeError::Inverted);
        }
        if (to - from).num_days() >= MAX_RANGE_DAYS {
            return Err(DateRangeError::TooLong);
        }
        Ok(Self { from, to })
    }

    /// The `days`-long range ending on `to`.
    pub fn trailing_days(to: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)).min(MAX_RANGE_DAYS) - 1;
        Self {
            from: to - Duration::days(span),
            to,
        }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Whether `date` lies inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// First instant of the range.
    pub fn start_instant(&self) -> DateTime<Utc> {
        self.from.and_time(NaiveTime::MIN).and_utc()
    }

    /// First instant after the range, for half-open timestamp queries.
    pub fn end_instant_exclusive(&self) -> DateTime<Utc> {
        (self.to + Duration::days(1)).and_time(NaiveTime::MIN).and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).expect("date")
    }

    #[rstest]
    fn rejects_inverted_ranges() {
        assert_eq!(DateRange::new(day(5), day(4)), Err(DateRangeError::Inverted));
    }

    #[rstest]
    fn rejects_ranges_longer_than_a_year() {
        let from = NaiveDate::from_ymd_opt(2025, 1, 1).expect("date");
        let to = NaiveDate::from_ymd_opt(2026, 1, 2).expect("date");
        assert_eq!(DateRange::new(from, to), Err(DateRangeError::TooLong));
    }

    #[rstest]
    fn single_day_range_spans_one_day_of_instants() {
        let range = DateRange::new(day(3), day(3)).expect("range");
        assert_eq!(
            range.end_instant_exclusive() - range.start_instant(),
            Duration::days(1)
        );
    }

    #[rstest]
    #[case(1, day(31))]
    #[case(30, day(2))]
    fn trailing_days_ends_on_given_day(#[case] days: u32, #[case] from: NaiveDate) {
        let range = DateRange::trailing_days(day(31), days);
        assert_eq!(range.from(), from);
        assert_eq!(range.to(), day(31));
    }
}
