//! CSV price data adapter.
//!
//! One `<SYMBOL>.csv` file per symbol with a `date,open,close` header. Empty
//! cells are missing values (forward-filled later by the domain). Files may
//! cover different date ranges; all dates are unioned into one strictly
//! increasing index and each column is aligned against it.

use crate::domain::error::WeekrotError;
use crate::domain::prices::{PriceField, PriceHistory};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

#[derive(Debug)]
pub struct CsvDataAdapter {
    base_path: PathBuf,
}

struct SymbolRow {
    date: NaiveDate,
    open: Option<f64>,
    close: Option<f64>,
}

impl CsvDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, WeekrotError> {
        let path = config
            .get_string("data", "path")
            .ok_or_else(|| WeekrotError::ConfigMissing {
                section: "data".into(),
                key: "path".into(),
            })?;
        Ok(Self::new(PathBuf::from(path)))
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Rows for `symbol`, or `None` when no file exists for it. A present
    /// file missing the open or close header column fails immediately.
    fn read_symbol(&self, symbol: &str) -> Result<Option<Vec<SymbolRow>>, WeekrotError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Ok(None);
        }

        let mut rdr = csv::Reader::from_path(&path).map_err(|e| WeekrotError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let headers = rdr
            .headers()
            .map_err(|e| WeekrotError::Data {
                reason: format!("CSV header error in {}: {}", path.display(), e),
            })?
            .clone();
        let col = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let date_col = col("date").ok_or_else(|| WeekrotError::Data {
            reason: format!("missing date column in {}", path.display()),
        })?;
        let open_col = col("open").ok_or_else(|| WeekrotError::MissingData {
            field: PriceField::Open.to_string(),
            symbol: symbol.to_string(),
        })?;
        let close_col = col("close").ok_or_else(|| WeekrotError::MissingData {
            field: PriceField::Close.to_string(),
            symbol: symbol.to_string(),
        })?;

        let mut rows = Vec::new();
        let mut seen = BTreeSet::new();

        for result in rdr.records() {
            let record = result.map_err(|e| WeekrotError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = record.get(date_col).unwrap_or_default();
            let date =
                NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| WeekrotError::Data {
                    reason: format!("invalid date '{}' in {}: {}", date_str, path.display(), e),
                })?;
            if !seen.insert(date) {
                return Err(WeekrotError::Data {
                    reason: format!("duplicate date {} in {}", date, path.display()),
                });
            }

            let cell = |i: usize, name: &str| -> Result<Option<f64>, WeekrotError> {
                let raw = record.get(i).unwrap_or_default().trim();
                if raw.is_empty() {
                    return Ok(None);
                }
                raw.parse::<f64>().map(Some).map_err(|e| WeekrotError::Data {
                    reason: format!(
                        "invalid {} value '{}' on {} in {}: {}",
                        name,
                        raw,
                        date,
                        path.display(),
                        e
                    ),
                })
            };

            rows.push(SymbolRow {
                date,
                open: cell(open_col, "open")?,
                close: cell(close_col, "close")?,
            });
        }

        Ok(Some(rows))
    }
}

impl PriceDataPort for CsvDataAdapter {
    fn fetch_history(&self, symbols: &[String]) -> Result<PriceHistory, WeekrotError> {
        let mut per_symbol: Vec<(String, Vec<SymbolRow>)> = Vec::new();
        for symbol in symbols {
            if let Some(rows) = self.read_symbol(symbol)? {
                per_symbol.push((symbol.clone(), rows));
            }
        }

        let unique_dates: BTreeSet<NaiveDate> = per_symbol
            .iter()
            .flat_map(|(_, rows)| rows.iter().map(|r| r.date))
            .collect();
        let dates: Vec<NaiveDate> = unique_dates.into_iter().collect();
        let index: HashMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let mut history = PriceHistory::new(dates);
        for (symbol, rows) in &per_symbol {
            let mut open = vec![None; history.len()];
            let mut close = vec![None; history.len()];
            for row in rows {
                let i = index[&row.date];
                open[i] = row.open;
                close[i] = row.close;
            }
            history.set_column(symbol, PriceField::Open, open)?;
            history.set_column(symbol, PriceField::Close, close)?;
        }

        Ok(history)
    }

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, WeekrotError> {
        let Some(rows) = self.read_symbol(symbol)? else {
            return Ok(None);
        };
        let (Some(min), Some(max)) = (
            rows.iter().map(|r| r.date).min(),
            rows.iter().map(|r| r.date).max(),
        ) else {
            return Ok(None);
        };
        Ok(Some((min, max, rows.len())))
    }
}
