//! Price data access port trait.

use crate::domain::error::WeekrotError;
use crate::domain::prices::PriceHistory;
use chrono::NaiveDate;

pub trait PriceDataPort {
    /// Fetch Open/Close history for `symbols` over a shared date index.
    /// Symbols without any data simply contribute no columns; the domain's
    /// fail-fast validation reports them as missing.
    fn fetch_history(&self, symbols: &[String]) -> Result<PriceHistory, WeekrotError>;

    /// First date, last date and row count available for `symbol`.
    fn data_range(&self, symbol: &str) -> Result<Option<(NaiveDate, NaiveDate, usize)>, WeekrotError>;
}
