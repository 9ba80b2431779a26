//! Per-day rotation state machine.
//!
//! One transition per trading day: enter on the first day of a new ISO week,
//! exit on take-profit, break-even stop, or week-end unwind. Two timing
//! conventions are supported and selected by configuration:
//!
//! - [`TimingConvention::PriorClose`]: exits are decided against yesterday's
//!   close and applied at today's open, so every decision for a day uses only
//!   information available at that day's open (no look-ahead). This is the
//!   convention any performance claim must use.
//! - [`TimingConvention::SameCloseDeferred`]: exits are signaled against
//!   today's close and realized the following day via a pending flag. The
//!   signal day still carries full exposure.

use crate::domain::calendar::{is_last_trading_day_of_week, is_new_week, week_key};
use crate::domain::position::{LongPosition, PendingExit, Position};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingConvention {
    PriorClose,
    SameCloseDeferred,
}

impl TimingConvention {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "prior_close" => Some(TimingConvention::PriorClose),
            "same_close_deferred" => Some(TimingConvention::SameCloseDeferred),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimingConvention::PriorClose => "prior_close",
            TimingConvention::SameCloseDeferred => "same_close_deferred",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotationConfig {
    /// Calendar positions skipped entirely at the start of the series.
    pub warmup_days: usize,
    /// Take-profit threshold relative to entry (0.07 = +7%).
    pub take_profit_pct: f64,
    /// Legacy second take-profit threshold. Checked first but dominated by
    /// `take_profit_pct` whenever it is the larger of the two; kept as its
    /// own check so existing schedules reproduce exactly.
    pub legacy_take_profit_pct: f64,
    pub timing: TimingConvention,
}

impl Default for RotationConfig {
    fn default() -> Self {
        RotationConfig {
            warmup_days: 20,
            take_profit_pct: 0.07,
            legacy_take_profit_pct: 0.081,
            timing: TimingConvention::PriorClose,
        }
    }
}

/// State carried between days. Owned by the emitter; each step consumes the
/// previous value and returns the next.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RotationState {
    pub position: Position,
    pub pending: Option<PendingExit>,
}

impl RotationState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Price and calendar facts for one trading day.
#[derive(Debug, Clone, Copy)]
pub struct DayFacts {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub prev_date: Option<NaiveDate>,
    pub prev_close: Option<f64>,
    pub next_date: Option<NaiveDate>,
}

/// Which rule closed (or signaled closing) the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    LegacyTakeProfit,
    TakeProfit,
    BreakEven,
    WeekEnd,
}

/// Take-profit and break-even checks against a close: legacy threshold,
/// current threshold, then break-even. First hit wins.
fn price_exit(long: &LongPosition, close: f64, config: &RotationConfig) -> Option<ExitReason> {
    if long.hit_take_profit(close, config.legacy_take_profit_pct) {
        Some(ExitReason::LegacyTakeProfit)
    } else if long.hit_take_profit(close, config.take_profit_pct) {
        Some(ExitReason::TakeProfit)
    } else if long.below_entry(close) {
        Some(ExitReason::BreakEven)
    } else {
        None
    }
}

fn enter(facts: &DayFacts) -> Position {
    Position::Long(LongPosition {
        entry_price: facts.open,
        entry_date: facts.date,
        entry_week: week_key(facts.date),
    })
}

/// Advance one trading day, returning the next state and today's weight for
/// the traded instrument.
pub fn step(state: RotationState, config: &RotationConfig, facts: &DayFacts) -> (RotationState, f64) {
    match config.timing {
        TimingConvention::PriorClose => step_prior_close(state, config, facts),
        TimingConvention::SameCloseDeferred => step_same_close_deferred(state, config, facts),
    }
}

fn step_prior_close(
    state: RotationState,
    config: &RotationConfig,
    facts: &DayFacts,
) -> (RotationState, f64) {
    let mut position = state.position;

    // Decide on yesterday's close; an exit takes effect at today's open.
    if let Position::Long(ref long) = position {
        if let (Some(prev_date), Some(prev_close)) = (facts.prev_date, facts.prev_close) {
            let exit = price_exit(long, prev_close, config).is_some()
                || is_last_trading_day_of_week(prev_date, Some(facts.date));
            if exit {
                position = Position::Flat;
            }
        }
    }

    // Entry is evaluated after exits in the same pass, so a week-end exit
    // re-enters immediately when today starts the new week.
    let weight = match position {
        Position::Flat => {
            if is_new_week(facts.prev_date, facts.date) {
                position = enter(facts);
                1.0
            } else {
                0.0
            }
        }
        Position::Long(_) => 1.0,
    };

    (
        RotationState {
            position,
            pending: None,
        },
        weight,
    )
}

fn step_same_close_deferred(
    state: RotationState,
    config: &RotationConfig,
    facts: &DayFacts,
) -> (RotationState, f64) {
    // A pending flag set yesterday is consumed before anything else; the
    // consumption day is flat and evaluates no entry or exit of its own.
    if state.pending.is_some() {
        return (RotationState::new(), 0.0);
    }

    match state.position {
        Position::Long(long) => {
            let pending = if price_exit(&long, facts.close, config).is_some() {
                Some(PendingExit::NextOpen)
            } else if is_last_trading_day_of_week(facts.date, facts.next_date) {
                Some(PendingExit::EndOfDay)
            } else {
                None
            };
            (
                RotationState {
                    position: Position::Long(long),
                    pending,
                },
                1.0,
            )
        }
        Position::Flat => {
            if is_new_week(facts.prev_date, facts.date) {
                (
                    RotationState {
                        position: enter(facts),
                        pending: None,
                    },
                    1.0,
                )
            } else {
                (RotationState::new(), 0.0)
            }
        }
    }
}
