//! Allocation schedule and the forward scheduling pass.
//!
//! The emitter owns the single mutable state slot between days: rows start
//! at zero, the warm-up window is skipped, and each remaining day delegates
//! to the rotation state machine and records its weight for the traded
//! instrument. The benchmark column exists for reporting and stays 0.0.

use crate::domain::calendar::TradingCalendar;
use crate::domain::error::WeekrotError;
use crate::domain::prices::PricePanel;
use crate::domain::rotation::{step, DayFacts, RotationConfig, RotationState};
use chrono::NaiveDate;

/// Per-day weight vectors over the asset universe, in calendar order.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationSchedule {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    weights: Vec<Vec<f64>>,
}

impl AllocationSchedule {
    /// All-zero schedule over `dates` for `assets`.
    pub fn zeroed(dates: Vec<NaiveDate>, assets: Vec<String>) -> Self {
        let weights = vec![vec![0.0; assets.len()]; dates.len()];
        Self {
            dates,
            assets,
            weights,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.weights[i]
    }

    pub fn weight(&self, i: usize, asset: usize) -> f64 {
        self.weights[i][asset]
    }

    pub fn set_weight(&mut self, i: usize, asset: usize, weight: f64) {
        self.weights[i][asset] = weight;
    }

    /// Number of days with non-zero weight for `asset`.
    pub fn exposure_days(&self, asset: usize) -> usize {
        self.weights.iter().filter(|row| row[asset] > 0.0).count()
    }
}

/// Drive one forward pass over the calendar and emit the schedule.
///
/// The traded instrument is asset 0, the benchmark asset 1. The calendar and
/// panel must cover the same positions.
pub fn run_schedule(
    calendar: &TradingCalendar,
    panel: &PricePanel,
    symbol: &str,
    benchmark: &str,
    config: &RotationConfig,
) -> Result<AllocationSchedule, WeekrotError> {
    if calendar.len() != panel.len() {
        return Err(WeekrotError::Data {
            reason: format!(
                "calendar has {} dates but price panel has {} rows",
                calendar.len(),
                panel.len()
            ),
        });
    }

    let mut schedule = AllocationSchedule::zeroed(
        calendar.dates().to_vec(),
        vec![symbol.to_string(), benchmark.to_string()],
    );

    let mut state = RotationState::new();
    for i in 0..calendar.len() {
        if i < config.warmup_days {
            continue;
        }

        let facts = DayFacts {
            date: calendar.date(i),
            open: panel.open_at(symbol, i),
            close: panel.close_at(symbol, i),
            prev_date: calendar.prev_date(i),
            prev_close: i.checked_sub(1).map(|j| panel.close_at(symbol, j)),
            next_date: calendar.next_date(i),
        };

        let (next, weight) = step(state, config, &facts);
        state = next;
        schedule.set_weight(i, 0, weight);
    }

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prices::{PriceField, PriceHistory};
    use crate::domain::rotation::TimingConvention;
    use approx::assert_relative_eq;
    use chrono::Datelike;
    use proptest::prelude::*;

    /// First `n` weekdays starting Monday 2024-01-01.
    fn weekdays(n: usize) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(n);
        let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        while dates.len() < n {
            if date.weekday().number_from_monday() <= 5 {
                dates.push(date);
            }
            date = date.succ_opt().unwrap();
        }
        dates
    }

    fn setup(
        dates: Vec<NaiveDate>,
        opens: Vec<f64>,
        closes: Vec<f64>,
    ) -> (TradingCalendar, PricePanel) {
        let mut history = PriceHistory::new(dates.clone());
        let some = |v: Vec<f64>| v.into_iter().map(Some).collect::<Vec<_>>();
        history
            .set_column("TQQQ", PriceField::Open, some(opens))
            .unwrap();
        history
            .set_column("TQQQ", PriceField::Close, some(closes))
            .unwrap();
        history
            .set_column("SPY", PriceField::Open, vec![Some(1.0); dates.len()])
            .unwrap();
        history
            .set_column("SPY", PriceField::Close, vec![Some(1.0); dates.len()])
            .unwrap();

        let calendar = TradingCalendar::new(dates).unwrap();
        let panel = PricePanel::prepare(&history, &["TQQQ", "SPY"]).unwrap();
        (calendar, panel)
    }

    fn config(timing: TimingConvention, warmup_days: usize) -> RotationConfig {
        RotationConfig {
            warmup_days,
            timing,
            ..Default::default()
        }
    }

    #[test]
    fn warmup_rows_are_all_zero() {
        let n = 23;
        let dates = weekdays(n);
        let (calendar, panel) = setup(dates, vec![100.0; n], vec![101.0; n]);

        for timing in [TimingConvention::PriorClose, TimingConvention::SameCloseDeferred] {
            let schedule =
                run_schedule(&calendar, &panel, "TQQQ", "SPY", &config(timing, 20)).unwrap();
            for i in 0..20 {
                assert_relative_eq!(schedule.weight(i, 0), 0.0);
                assert_relative_eq!(schedule.weight(i, 1), 0.0);
            }
        }
    }

    #[test]
    fn benchmark_column_stays_zero() {
        let n = 30;
        let dates = weekdays(n);
        let (calendar, panel) = setup(dates, vec![100.0; n], vec![103.0; n]);
        let schedule = run_schedule(
            &calendar,
            &panel,
            "TQQQ",
            "SPY",
            &config(TimingConvention::PriorClose, 5),
        )
        .unwrap();

        for i in 0..n {
            assert_relative_eq!(schedule.weight(i, 1), 0.0);
        }
    }

    /// 20 warm-up days put calendar position 20 on Monday 2024-01-29. Entry
    /// fires there at the open; day 21's close hits +8%; the two conventions
    /// then diverge by exactly one day.
    #[test]
    fn take_profit_timing_divergence() {
        let n = 23;
        let dates = weekdays(n);
        assert_eq!(dates[20], NaiveDate::from_ymd_opt(2024, 1, 29).unwrap());

        let mut opens = vec![50.0; n];
        let mut closes = vec![50.0; n];
        opens[20] = 100.0; // entry price
        closes[20] = 101.0;
        opens[21] = 102.0;
        closes[21] = 108.0; // +8% over entry
        opens[22] = 109.0;
        closes[22] = 109.0;

        let (calendar, panel) = setup(dates, opens, closes);

        let prior = run_schedule(
            &calendar,
            &panel,
            "TQQQ",
            "SPY",
            &config(TimingConvention::PriorClose, 20),
        )
        .unwrap();
        assert_relative_eq!(prior.weight(20, 0), 1.0);
        assert_relative_eq!(prior.weight(21, 0), 1.0); // signal not yet visible
        assert_relative_eq!(prior.weight(22, 0), 0.0); // exit on yesterday's close

        let deferred = run_schedule(
            &calendar,
            &panel,
            "TQQQ",
            "SPY",
            &config(TimingConvention::SameCloseDeferred, 20),
        )
        .unwrap();
        assert_relative_eq!(deferred.weight(20, 0), 1.0);
        assert_relative_eq!(deferred.weight(21, 0), 1.0); // signal day, still exposed
        assert_relative_eq!(deferred.weight(22, 0), 0.0); // flag consumed
    }

    /// Full week inside (entry, +7%) with no stop: exposure holds through
    /// Friday under both conventions, and under the prior-close convention
    /// the Monday week-end unwind re-enters immediately.
    #[test]
    fn hold_through_week_and_reenter() {
        let n = 10; // Mon 2024-01-01 .. Fri 2024-01-12
        let dates = weekdays(n);
        let opens = vec![100.0, 101.0, 102.0, 101.0, 102.0, 103.0, 102.0, 103.0, 104.0, 103.0];
        let closes = vec![101.0, 102.0, 101.0, 102.0, 103.0, 104.0, 103.0, 104.0, 105.0, 104.0];
        let (calendar, panel) = setup(dates, opens, closes);

        let prior = run_schedule(
            &calendar,
            &panel,
            "TQQQ",
            "SPY",
            &config(TimingConvention::PriorClose, 0),
        )
        .unwrap();
        // continuous exposure across the week boundary (exit + instant re-entry)
        for i in 0..10 {
            assert_relative_eq!(prior.weight(i, 0), 1.0, epsilon = 0.0);
        }

        let deferred = run_schedule(
            &calendar,
            &panel,
            "TQQQ",
            "SPY",
            &config(TimingConvention::SameCloseDeferred, 0),
        )
        .unwrap();
        // exposed through Friday, flat on flag-consumption Monday, then flat
        // until the next ISO week change
        for i in 0..5 {
            assert_relative_eq!(deferred.weight(i, 0), 1.0);
        }
        assert_relative_eq!(deferred.weight(5, 0), 0.0);
    }

    #[test]
    fn break_even_exit_stays_flat_until_next_week() {
        let n = 10;
        let dates = weekdays(n);
        // Tuesday's close dips below Monday's open
        let opens = vec![100.0, 100.0, 99.0, 99.0, 99.0, 99.0, 99.5, 99.5, 99.5, 99.5];
        let closes = vec![100.5, 99.0, 99.2, 99.1, 99.3, 99.4, 99.2, 99.3, 99.1, 99.2];
        let (calendar, panel) = setup(dates, opens, closes);

        let schedule = run_schedule(
            &calendar,
            &panel,
            "TQQQ",
            "SPY",
            &config(TimingConvention::PriorClose, 0),
        )
        .unwrap();

        assert_relative_eq!(schedule.weight(0, 0), 1.0); // entry Monday
        assert_relative_eq!(schedule.weight(1, 0), 1.0); // Monday close was fine
        assert_relative_eq!(schedule.weight(2, 0), 0.0); // Tuesday closed below entry
        for i in 3..5 {
            assert_relative_eq!(schedule.weight(i, 0), 0.0);
        }
        assert_relative_eq!(schedule.weight(5, 0), 1.0); // next Monday re-entry
    }

    #[test]
    fn calendar_and_panel_length_mismatch_is_rejected() {
        let dates = weekdays(5);
        let (_, panel) = setup(dates, vec![100.0; 5], vec![101.0; 5]);
        let short_calendar = TradingCalendar::new(weekdays(4)).unwrap();

        let err = run_schedule(
            &short_calendar,
            &panel,
            "TQQQ",
            "SPY",
            &RotationConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, WeekrotError::Data { .. }));
    }

    #[test]
    fn warmup_longer_than_series_yields_all_zero() {
        let n = 5;
        let dates = weekdays(n);
        let (calendar, panel) = setup(dates, vec![100.0; n], vec![110.0; n]);
        let schedule = run_schedule(
            &calendar,
            &panel,
            "TQQQ",
            "SPY",
            &config(TimingConvention::PriorClose, 20),
        )
        .unwrap();

        assert_eq!(schedule.exposure_days(0), 0);
    }

    proptest! {
        /// Same inputs, same schedule: the pass is deterministic, and every
        /// weight is exactly 0.0 or 1.0 with warm-up rows zero.
        #[test]
        fn schedule_is_deterministic_and_binary(
            closes in proptest::collection::vec(50.0f64..150.0, 25..60),
            warmup in 0usize..25,
            deferred in proptest::bool::ANY,
        ) {
            let n = closes.len();
            let dates = weekdays(n);
            let opens: Vec<f64> = closes.iter().map(|c| c * 0.99).collect();
            let (calendar, panel) = setup(dates, opens, closes);
            let timing = if deferred {
                TimingConvention::SameCloseDeferred
            } else {
                TimingConvention::PriorClose
            };
            let cfg = config(timing, warmup);

            let first = run_schedule(&calendar, &panel, "TQQQ", "SPY", &cfg).unwrap();
            let second = run_schedule(&calendar, &panel, "TQQQ", "SPY", &cfg).unwrap();
            prop_assert_eq!(&first, &second);

            for i in 0..n {
                let w = first.weight(i, 0);
                prop_assert!(w == 0.0 || w == 1.0);
                prop_assert_eq!(first.weight(i, 1), 0.0);
                if i < warmup {
                    prop_assert_eq!(w, 0.0);
                }
            }
        }

        /// Exposure can only begin on a day whose ISO week differs from the
        /// previous processed day's.
        #[test]
        fn exposure_starts_only_on_week_changes(
            closes in proptest::collection::vec(50.0f64..150.0, 25..60),
            warmup in 0usize..25,
        ) {
            use crate::domain::calendar::is_new_week;

            let n = closes.len();
            let dates = weekdays(n);
            let opens: Vec<f64> = closes.iter().map(|c| c * 0.99).collect();
            let (calendar, panel) = setup(dates, opens, closes);
            let cfg = config(TimingConvention::PriorClose, warmup);
            let schedule = run_schedule(&calendar, &panel, "TQQQ", "SPY", &cfg).unwrap();

            for i in warmup..n {
                let flat_before = i == warmup || schedule.weight(i - 1, 0) == 0.0;
                if schedule.weight(i, 0) == 1.0 && flat_before {
                    prop_assert!(is_new_week(calendar.prev_date(i), calendar.date(i)));
                }
            }
        }
    }
}
