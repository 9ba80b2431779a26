//! Position state held by the rotation strategy.

use crate::domain::calendar::WeekKey;
use chrono::NaiveDate;

/// Entry facts carried while long. Created on entry, destroyed on exit.
#[derive(Debug, Clone, PartialEq)]
pub struct LongPosition {
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub entry_week: WeekKey,
}

impl LongPosition {
    /// Close at or above `entry_price * (1 + pct)`.
    pub fn hit_take_profit(&self, close: f64, pct: f64) -> bool {
        close >= self.entry_price * (1.0 + pct)
    }

    /// Close strictly below the entry price.
    pub fn below_entry(&self, close: f64) -> bool {
        close < self.entry_price
    }
}

/// The strategy is either flat or fully long the traded instrument.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Position {
    #[default]
    Flat,
    Long(LongPosition),
}

impl Position {
    pub fn is_long(&self) -> bool {
        matches!(self, Position::Long(_))
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat)
    }
}

/// One-day-deferred exit instruction, used only by the same-close deferred
/// timing convention. Set the day an exit condition fires, consumed and
/// cleared the following day before any other logic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingExit {
    /// Take-profit or break-even stop signaled on today's close.
    NextOpen,
    /// Week-end unwind signaled on the last trading day of the ISO week.
    EndOfDay,
}
