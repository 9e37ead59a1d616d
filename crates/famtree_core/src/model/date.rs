//! Partial date value type.
//!
//! # Responsibility
//! - Represent dates whose year, month and day may each be unknown.
//! - Provide the ordering and period rules used for ages and sorting.
//!
//! # Invariants
//! - At least one component is set.
//! - A set year is in `0..=9999` so it always renders as four digits.
//! - A set month is in `1..=12`; a set day fits the month when the month is
//!   known, and `1..=31` otherwise.
//! - Values are immutable once built; `PartialDateBuilder` is the only
//!   mutable phase.

use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Largest representable year.
pub const MAX_YEAR: i32 = 9999;

/// Errors from partial date construction and period computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateError {
    /// No component set, or a component out of range.
    InvalidDate {
        year: Option<i32>,
        month: Option<u32>,
        day: Option<u32>,
    },
    /// Period computation needs full year/month/day on both sides.
    IncompleteDate,
}

impl Display for DateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate { year, month, day } => write!(
                f,
                "invalid partial date: year={} month={} day={}",
                fmt_component(*year),
                fmt_component(*month),
                fmt_component(*day)
            ),
            Self::IncompleteDate => {
                write!(f, "period computation requires complete dates")
            }
        }
    }
}

impl Error for DateError {}

fn fmt_component<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "?".to_string(), |value| value.to_string())
}

/// A date where year, month and day are independently known or unknown.
///
/// Ordering is lexicographic over `(year, month, day)` with an unknown
/// component sorting before any known one. See [`PartialDate::cmp_degraded`]
/// for the coarser comparison this order refines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartialDate {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
}

impl PartialDate {
    /// Builds a partial date, rejecting empty or out-of-range values.
    ///
    /// # Errors
    /// - `DateError::InvalidDate` when every component is `None`.
    /// - `DateError::InvalidDate` when `year` is outside `0..=9999`.
    /// - `DateError::InvalidDate` when `month` is outside `1..=12`.
    /// - `DateError::InvalidDate` when `day` does not fit the month (or
    ///   `1..=31` when the month is unknown).
    pub fn new(
        year: Option<i32>,
        month: Option<u32>,
        day: Option<u32>,
    ) -> Result<Self, DateError> {
        let invalid = DateError::InvalidDate { year, month, day };
        if year.is_none() && month.is_none() && day.is_none() {
            return Err(invalid);
        }
        if let Some(year) = year {
            if !(0..=MAX_YEAR).contains(&year) {
                return Err(invalid);
            }
        }
        if let Some(month) = month {
            if !(1..=12).contains(&month) {
                return Err(invalid);
            }
        }
        if let Some(day) = day {
            let max_day = month.map_or(31, |month| days_in_month(year, month));
            if day < 1 || day > max_day {
                return Err(invalid);
            }
        }
        Ok(Self { year, month, day })
    }

    /// Builds a complete date.
    pub fn ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        Self::new(Some(year), Some(month), Some(day))
    }

    /// Starts a builder with no component set.
    pub fn builder() -> PartialDateBuilder {
        PartialDateBuilder::default()
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    /// Returns whether year, month and day are all known.
    pub fn is_complete(&self) -> bool {
        self.year.is_some() && self.month.is_some() && self.day.is_some()
    }

    /// Number of days in this date's month, when the month is known.
    ///
    /// February of an unknown year counts 29 days.
    pub fn days_in_month(&self) -> Option<u32> {
        self.month.map(|month| days_in_month(self.year, month))
    }

    /// Granularity-degrading comparison.
    ///
    /// - Both dates have year and month, one lacks the day: compare by
    ///   `(year, month)`.
    /// - Both dates have a year, one lacks the month: compare by year.
    /// - Otherwise: compare the full `(year, month, day)` tuple.
    ///
    /// This comparison is not a total order (`2000-01-??` and `2000-01-15`
    /// compare `Equal`); the `Ord` impl breaks those ties and never
    /// contradicts a non-`Equal` result from here.
    pub fn cmp_degraded(&self, other: &Self) -> Ordering {
        match (self.year, self.month, other.year, other.month) {
            (Some(y1), Some(m1), Some(y2), Some(m2))
                if self.day.is_none() || other.day.is_none() =>
            {
                (y1, m1).cmp(&(y2, m2))
            }
            (Some(y1), _, Some(y2), _) if self.month.is_none() || other.month.is_none() => {
                y1.cmp(&y2)
            }
            _ => self.key().cmp(&other.key()),
        }
    }

    /// Returns whether `self` is strictly before `other`.
    pub fn before(&self, other: &Self) -> bool {
        self < other
    }

    /// Returns whether `self` is strictly after `other`.
    pub fn after(&self, other: &Self) -> bool {
        self > other
    }

    /// Computes the elapsed `(years, months, days)` between two complete dates.
    ///
    /// Arguments may be given in either order; the result is always
    /// non-negative. When the end day is before the start day, one month is
    /// given back and the days are counted against the length of the start
    /// month: `2000-01-15 -> 2000-03-10` is 1 month and `31 - 5 = 26` days.
    ///
    /// # Errors
    /// - `DateError::IncompleteDate` when either date lacks a component.
    pub fn period(start: &PartialDate, end: &PartialDate) -> Result<Period, DateError> {
        let (Some(start_ymd), Some(end_ymd)) = (start.full(), end.full()) else {
            return Err(DateError::IncompleteDate);
        };
        let ((sy, sm, sd), (ey, em, ed)) = if end_ymd < start_ymd {
            (end_ymd, start_ymd)
        } else {
            (start_ymd, end_ymd)
        };

        let mut total_months = (ey - sy) * 12 + (em as i32 - sm as i32);
        let days = if sd > ed {
            total_months -= 1;
            days_in_month(Some(sy), sm) - (sd - ed)
        } else {
            ed - sd
        };

        Ok(Period {
            years: (total_months / 12) as u32,
            months: (total_months % 12) as u32,
            days,
        })
    }

    /// Best-effort period at the finest granularity both dates share.
    ///
    /// - Both complete: same as [`PartialDate::period`].
    /// - Both have year and month: whole months, `days = 0`.
    /// - Both have a year: whole years.
    /// - Otherwise: `None`.
    pub fn approximate_period(start: &PartialDate, end: &PartialDate) -> Option<Period> {
        if let Ok(period) = Self::period(start, end) {
            return Some(period);
        }
        match (start.year, start.month, end.year, end.month) {
            (Some(sy), Some(sm), Some(ey), Some(em)) => {
                let total = ((ey - sy) * 12 + (em as i32 - sm as i32)).unsigned_abs();
                Some(Period::new(total / 12, total % 12, 0))
            }
            (Some(sy), _, Some(ey), _) => Some(Period::new((ey - sy).unsigned_abs(), 0, 0)),
            _ => None,
        }
    }

    fn key(&self) -> (Option<i32>, Option<u32>, Option<u32>) {
        (self.year, self.month, self.day)
    }

    fn full(&self) -> Option<(i32, u32, u32)> {
        Some((self.year?, self.month?, self.day?))
    }
}

impl PartialOrd for PartialDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PartialDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Display for PartialDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.year {
            Some(year) => write!(f, "{year:04}")?,
            None => write!(f, "????")?,
        }
        match self.month {
            Some(month) => write!(f, "-{month:02}")?,
            None => write!(f, "-??")?,
        }
        match self.day {
            Some(day) => write!(f, "-{day:02}"),
            None => write!(f, "-??"),
        }
    }
}

/// Mutable builder for [`PartialDate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialDateBuilder {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
}

impl PartialDateBuilder {
    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    /// Validates and freezes the collected components.
    pub fn build(self) -> Result<PartialDate, DateError> {
        PartialDate::new(self.year, self.month, self.day)
    }
}

/// Normalized elapsed time between two dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Period {
    pub years: u32,
    /// Always `< 12`.
    pub months: u32,
    pub days: u32,
}

impl Period {
    pub fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub(crate) fn days_in_month(year: Option<i32>, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => match year {
            Some(year) if !is_leap_year(year) => 28,
            _ => 29,
        },
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::{DateError, PartialDate, Period};
    use std::cmp::Ordering;

    fn date(year: Option<i32>, month: Option<u32>, day: Option<u32>) -> PartialDate {
        PartialDate::new(year, month, day).unwrap()
    }

    #[test]
    fn new_rejects_empty_date() {
        let err = PartialDate::new(None, None, None).unwrap_err();
        assert!(matches!(err, DateError::InvalidDate { .. }));
    }

    #[test]
    fn new_rejects_out_of_range_components() {
        assert!(PartialDate::new(Some(2000), Some(13), None).is_err());
        assert!(PartialDate::new(Some(2000), Some(0), None).is_err());
        assert!(PartialDate::new(Some(2001), Some(2), Some(29)).is_err());
        assert!(PartialDate::new(None, None, Some(32)).is_err());
        assert!(PartialDate::new(None, Some(4), Some(31)).is_err());
        assert!(PartialDate::new(Some(10_000), None, None).is_err());
        assert!(PartialDate::new(Some(-1), None, None).is_err());
    }

    #[test]
    fn february_of_unknown_year_allows_29() {
        assert!(PartialDate::new(None, Some(2), Some(29)).is_ok());
        assert!(PartialDate::new(Some(2000), Some(2), Some(29)).is_ok());
        assert!(PartialDate::new(Some(1900), Some(2), Some(29)).is_err());
    }

    #[test]
    fn builder_matches_constructor() {
        let built = PartialDate::builder().year(1980).day(4).build().unwrap();
        assert_eq!(built, date(Some(1980), None, Some(4)));
        assert!(PartialDate::builder().build().is_err());
    }

    #[test]
    fn display_uses_placeholders() {
        assert_eq!(date(Some(1990), Some(3), Some(7)).to_string(), "1990-03-07");
        assert_eq!(date(Some(1990), None, None).to_string(), "1990-??-??");
        assert_eq!(date(None, Some(12), None).to_string(), "????-12-??");
    }

    #[test]
    fn degraded_comparison_ignores_missing_day() {
        let month_only = date(Some(2000), Some(1), None);
        let full = date(Some(2000), Some(1), Some(15));
        assert_eq!(month_only.cmp_degraded(&full), Ordering::Equal);
        assert_eq!(month_only.cmp(&full), Ordering::Less);
    }

    #[test]
    fn degraded_comparison_ignores_missing_month() {
        let year_only = date(Some(2000), None, None);
        let later = date(Some(2000), Some(6), Some(1));
        let earlier_year = date(Some(1999), Some(12), Some(31));
        assert_eq!(year_only.cmp_degraded(&later), Ordering::Equal);
        assert_eq!(year_only.cmp_degraded(&earlier_year), Ordering::Greater);
        assert!(year_only.before(&later));
        assert!(year_only.after(&earlier_year));
    }

    #[test]
    fn unknown_year_sorts_first() {
        let no_year = date(None, Some(12), Some(31));
        let old = date(Some(1), Some(1), Some(1));
        assert!(no_year < old);
    }

    #[test]
    fn period_borrows_days_from_previous_month() {
        let start = PartialDate::ymd(2000, 1, 2).unwrap();
        let end = PartialDate::ymd(2000, 2, 1).unwrap();
        assert_eq!(PartialDate::period(&start, &end).unwrap(), Period::new(0, 0, 30));
    }

    #[test]
    fn period_borrows_months_from_year() {
        let start = PartialDate::ymd(1990, 11, 20).unwrap();
        let end = PartialDate::ymd(2000, 3, 10).unwrap();
        assert_eq!(PartialDate::period(&start, &end).unwrap(), Period::new(9, 3, 20));
    }

    #[test]
    fn period_counts_days_against_start_month() {
        let start = PartialDate::ymd(2000, 1, 31).unwrap();
        let end = PartialDate::ymd(2000, 3, 1).unwrap();
        assert_eq!(PartialDate::period(&start, &end).unwrap(), Period::new(0, 1, 1));
    }

    #[test]
    fn period_is_symmetric() {
        let a = PartialDate::ymd(1950, 6, 15).unwrap();
        let b = PartialDate::ymd(2020, 2, 29).unwrap();
        assert_eq!(
            PartialDate::period(&a, &b).unwrap(),
            PartialDate::period(&b, &a).unwrap()
        );
    }

    #[test]
    fn period_rejects_incomplete_dates() {
        let partial = date(Some(2000), Some(1), None);
        let full = PartialDate::ymd(2001, 1, 1).unwrap();
        assert_eq!(
            PartialDate::period(&partial, &full).unwrap_err(),
            DateError::IncompleteDate
        );
    }

    #[test]
    fn approximate_period_degrades_granularity() {
        let start = date(Some(1990), Some(5), None);
        let end = PartialDate::ymd(1992, 3, 14).unwrap();
        assert_eq!(
            PartialDate::approximate_period(&start, &end),
            Some(Period::new(1, 10, 0))
        );

        let start = date(Some(1990), None, None);
        assert_eq!(
            PartialDate::approximate_period(&start, &end),
            Some(Period::new(2, 0, 0))
        );

        let start = date(None, Some(5), Some(1));
        assert_eq!(PartialDate::approximate_period(&start, &end), None);
    }
}
