//! Strategy contract and the weekly rotation implementation.

use crate::domain::calendar::TradingCalendar;
use crate::domain::error::WeekrotError;
use crate::domain::prices::{PriceHistory, PricePanel};
use crate::domain::rotation::RotationConfig;
use crate::domain::schedule::{run_schedule, AllocationSchedule};

/// Narrow contract shared by schedulable strategies: identity, asset
/// universe, and a pure run over a price history.
pub trait Strategy {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn universe(&self) -> &[String];
    fn run(&self, history: &PriceHistory) -> Result<AllocationSchedule, WeekrotError>;
}

/// Weekly rotation into a single leveraged instrument: long from the first
/// trading day of each ISO week until take-profit, break-even stop, or
/// week-end unwind. The benchmark is carried in the universe for reporting
/// only and never receives weight.
#[derive(Debug, Clone)]
pub struct WeeklyRotation {
    universe: Vec<String>,
    pub config: RotationConfig,
}

impl WeeklyRotation {
    pub fn new(symbol: &str, benchmark: &str, config: RotationConfig) -> Self {
        Self {
            universe: vec![symbol.to_string(), benchmark.to_string()],
            config,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.universe[0]
    }

    pub fn benchmark(&self) -> &str {
        &self.universe[1]
    }
}

impl Strategy for WeeklyRotation {
    fn name(&self) -> &str {
        "WeeklyRotation"
    }

    fn version(&self) -> &str {
        "1.0"
    }

    fn universe(&self) -> &[String] {
        &self.universe
    }

    fn run(&self, history: &PriceHistory) -> Result<AllocationSchedule, WeekrotError> {
        let calendar = TradingCalendar::new(history.dates().to_vec())?;
        let panel = PricePanel::prepare(history, &[self.symbol(), self.benchmark()])?;
        run_schedule(&calendar, &panel, self.symbol(), self.benchmark(), &self.config)
    }
}
