//! Dual moving average with a trend filter.
//!
//! Enter on a fast/slow golden cross while close is above the trend MA.
//! Exit on a death cross regardless of the trend MA.

use super::params::{require_ordered, ParamSet, ParamSpec};
use super::{line_cross, Action, Cross, StrategyRule};
use crate::components::indicator::{Indicator, IndicatorValues};
use crate::domain::Bar;
use crate::error::Result;
use crate::indicators::Sma;

#[derive(Debug, Clone, PartialEq)]
pub struct DoubleMa {
    pub fast: usize,
    pub slow: usize,
    pub trend: usize,
}

impl DoubleMa {
    pub const ID: &'static str = "double_ma";
    pub const SCHEMA: &'static [ParamSpec] = &[
        ParamSpec::int("fast", 5.0, 2.0, 60.0, "fast moving average period"),
        ParamSpec::int("slow", 20.0, 5.0, 120.0, "slow moving average period"),
        ParamSpec::int("trend", 60.0, 20.0, 250.0, "trend filter moving average period"),
    ];

    pub fn from_params(p: &ParamSet) -> Result<Self> {
        let (fast, slow, trend) = (p.period("fast"), p.period("slow"), p.period("trend"));
        require_ordered(Self::ID, ("fast", fast), ("slow", slow))?;
        require_ordered(Self::ID, ("slow", slow), ("trend", trend))?;
        Ok(Self { fast, slow, trend })
    }
}

impl StrategyRule for DoubleMa {
    fn required_indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Sma::new(self.fast)),
            Box::new(Sma::new(self.slow)),
            Box::new(Sma::new(self.trend)),
        ]
    }

    fn evaluate(&self, bars: &[Bar], ind: &IndicatorValues, t: usize) -> Action {
        let fast = Sma::new(self.fast);
        let slow = Sma::new(self.slow);
        match line_cross(ind, fast.name(), slow.name(), t) {
            Cross::Up => match ind.get(Sma::new(self.trend).name(), t) {
                Some(trend) if bars[t].close > trend => Action::Enter,
                _ => Action::Hold,
            },
            Cross::Down => Action::Exit,
            Cross::None => Action::Hold,
        }
    }
}
