//! Price history, fail-fast column validation and forward-fill.
//!
//! `PriceHistory` holds the raw tabular input: a shared date index plus
//! per-symbol Open/Close columns in which both whole columns and individual
//! cells may be missing. `PricePanel` is the cleaned accessor used by the
//! scheduling pass: required columns are validated once up front, then
//! forward-filled so every calendar position has a defined Open and Close.

use crate::domain::error::WeekrotError;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    Close,
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceField::Open => write!(f, "Open"),
            PriceField::Close => write!(f, "Close"),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SymbolColumns {
    open: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
}

/// Raw price history as ingested, before cleaning.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    dates: Vec<NaiveDate>,
    symbols: HashMap<String, SymbolColumns>,
}

impl PriceHistory {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            symbols: HashMap::new(),
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Attach a column for `symbol`. The column must be aligned with the
    /// date index.
    pub fn set_column(
        &mut self,
        symbol: &str,
        field: PriceField,
        values: Vec<Option<f64>>,
    ) -> Result<(), WeekrotError> {
        if values.len() != self.dates.len() {
            return Err(WeekrotError::Data {
                reason: format!(
                    "column ({}, {}) has {} values for {} dates",
                    field,
                    symbol,
                    values.len(),
                    self.dates.len()
                ),
            });
        }
        let entry = self.symbols.entry(symbol.to_string()).or_default();
        match field {
            PriceField::Open => entry.open = Some(values),
            PriceField::Close => entry.close = Some(values),
        }
        Ok(())
    }

    fn column(&self, symbol: &str, field: PriceField) -> Option<&[Option<f64>]> {
        let cols = self.symbols.get(symbol)?;
        match field {
            PriceField::Open => cols.open.as_deref(),
            PriceField::Close => cols.close.as_deref(),
        }
    }
}

/// Forward-fill missing values from the most recent prior value; leading
/// gaps (nothing to fill from) become 0.0.
pub fn forward_fill(values: &[Option<f64>]) -> Vec<f64> {
    let mut filled = Vec::with_capacity(values.len());
    let mut last = 0.0;
    for v in values {
        if let Some(x) = v {
            last = *x;
        }
        filled.push(last);
    }
    filled
}

#[derive(Debug, Clone)]
struct FilledSeries {
    open: Vec<f64>,
    close: Vec<f64>,
}

/// Cleaned Open/Close accessor over the calendar positions of the input
/// history. Construction validates and fills every required column before
/// any day is processed; reads are total afterwards.
#[derive(Debug, Clone)]
pub struct PricePanel {
    series: HashMap<String, FilledSeries>,
    len: usize,
}

impl PricePanel {
    pub fn prepare(history: &PriceHistory, required: &[&str]) -> Result<Self, WeekrotError> {
        // Validate every (field, symbol) pair before filling anything.
        for symbol in required {
            for field in [PriceField::Open, PriceField::Close] {
                if history.column(symbol, field).is_none() {
                    return Err(WeekrotError::MissingData {
                        field: field.to_string(),
                        symbol: symbol.to_string(),
                    });
                }
            }
        }

        let mut series = HashMap::new();
        for symbol in required {
            let open = forward_fill(history.column(symbol, PriceField::Open).unwrap_or(&[]));
            let close = forward_fill(history.column(symbol, PriceField::Close).unwrap_or(&[]));
            series.insert(symbol.to_string(), FilledSeries { open, close });
        }

        Ok(Self {
            series,
            len: history.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Open at calendar position `i`. Panics if `symbol` was not in the
    /// required set passed to [`PricePanel::prepare`].
    pub fn open_at(&self, symbol: &str, i: usize) -> f64 {
        self.series[symbol].open[i]
    }

    /// Close at calendar position `i`. Same contract as [`Self::open_at`].
    pub fn close_at(&self, symbol: &str, i: usize) -> f64 {
        self.series[symbol].close[i]
    }
}
