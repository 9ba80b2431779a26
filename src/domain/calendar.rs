//! Trading calendar and ISO-week boundary detection.
//!
//! The calendar is an ordered, gap-tolerant sequence of distinct trading
//! dates. Week bucketing uses ISO 8601 (year, week) keys, so late-December
//! dates can belong to week 1 of the following year.

use crate::domain::error::WeekrotError;
use chrono::{Datelike, NaiveDate};

/// ISO 8601 (year, week-number) key for a trading date.
pub type WeekKey = (i32, u32);

pub fn week_key(date: NaiveDate) -> WeekKey {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}

/// True if `curr` starts a new ISO week relative to `prev`, or if `prev`
/// is undefined (start of series).
pub fn is_new_week(prev: Option<NaiveDate>, curr: NaiveDate) -> bool {
    match prev {
        None => true,
        Some(p) => week_key(p) != week_key(curr),
    }
}

/// True if `date` is the last trading day of its ISO week, i.e. `next` is
/// undefined (end of series) or falls in a different (year, week).
pub fn is_last_trading_day_of_week(date: NaiveDate, next: Option<NaiveDate>) -> bool {
    match next {
        None => true,
        Some(n) => week_key(date) != week_key(n),
    }
}

/// A strictly increasing, duplicate-free sequence of trading dates.
#[derive(Debug, Clone)]
pub struct TradingCalendar {
    dates: Vec<NaiveDate>,
}

impl TradingCalendar {
    /// Validates monotonicity. Duplicate or out-of-order dates are rejected
    /// rather than silently reordered.
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self, WeekrotError> {
        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(WeekrotError::MalformedCalendar {
                    reason: format!(
                        "dates must be strictly increasing: {} followed by {}",
                        pair[0], pair[1]
                    ),
                });
            }
        }
        Ok(Self { dates })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn date(&self, i: usize) -> NaiveDate {
        self.dates[i]
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Date at `i - 1`, or `None` at the start of the series.
    pub fn prev_date(&self, i: usize) -> Option<NaiveDate> {
        i.checked_sub(1).map(|j| self.dates[j])
    }

    /// Date at `i + 1`, or `None` at the end of the series.
    pub fn next_date(&self, i: usize) -> Option<NaiveDate> {
        self.dates.get(i + 1).copied()
    }
}
