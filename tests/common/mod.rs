#![allow(dead_code)]

use chrono::{Datelike, NaiveDate};
use weekrot::domain::error::WeekrotError;
use weekrot::domain::prices::{PriceField, PriceHistory};
use weekrot::ports::data_port::PriceDataPort;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// First `n` weekdays starting from `start` (inclusive if a weekday).
pub fn weekdays(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(n);
    let mut d = start;
    while dates.len() < n {
        if d.weekday().number_from_monday() <= 5 {
            dates.push(d);
        }
        d = d.succ_opt().unwrap();
    }
    dates
}

/// History over `dates` with the given open/close columns for `symbol` and a
/// flat benchmark column for "SPY".
pub fn history_with_prices(
    dates: Vec<NaiveDate>,
    symbol: &str,
    opens: Vec<f64>,
    closes: Vec<f64>,
) -> PriceHistory {
    let n = dates.len();
    let some = |v: Vec<f64>| v.into_iter().map(Some).collect::<Vec<_>>();
    let mut history = PriceHistory::new(dates);
    history
        .set_column(symbol, PriceField::Open, some(opens))
        .unwrap();
    history
        .set_column(symbol, PriceField::Close, some(closes))
        .unwrap();
    history
        .set_column("SPY", PriceField::Open, vec![Some(400.0); n])
        .unwrap();
    history
        .set_column("SPY", PriceField::Close, vec![Some(401.0); n])
        .unwrap();
    history
}

pub struct MockPricePort {
    pub history: PriceHistory,
    pub error: Option<String>,
}

impl MockPricePort {
    pub fn new(history: PriceHistory) -> Self {
        Self {
            history,
            error: None,
        }
    }

    pub fn with_error(reason: &str) -> Self {
        Self {
            history: PriceHistory::new(vec![]),
            error: Some(reason.to_string()),
        }
    }
}

impl PriceDataPort for MockPricePort {
    fn fetch_history(&self, _symbols: &[String]) -> Result<PriceHistory, WeekrotError> {
        if let Some(reason) = &self.error {
            return Err(WeekrotError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.history.clone())
    }

    fn data_range(
        &self,
        _symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, WeekrotError> {
        let dates = self.history.dates();
        match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => Ok(Some((*first, *last, dates.len()))),
            _ => Ok(None),
        }
    }
}
