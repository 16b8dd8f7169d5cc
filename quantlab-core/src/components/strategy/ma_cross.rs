//! Moving-average crossover.
//!
//! Enter when the fast MA crosses above the slow MA; exit when it crosses below.

use super::params::{require_ordered, ParamSet, ParamSpec};
use super::{line_cross, Action, Cross, StrategyRule};
use crate::components::indicator::{Indicator, IndicatorValues};
use crate::domain::Bar;
use crate::error::Result;
use crate::indicators::Sma;

#[derive(Debug, Clone, PartialEq)]
pub struct MaCross {
    pub fast: usize,
    pub slow: usize,
}

impl MaCross {
    pub const ID: &'static str = "ma_cross";
    pub const SCHEMA: &'static [ParamSpec] = &[
        ParamSpec::int("fast", 5.0, 2.0, 60.0, "fast moving average period"),
        ParamSpec::int("slow", 20.0, 5.0, 250.0, "slow moving average period"),
    ];

    pub fn from_params(p: &ParamSet) -> Result<Self> {
        let (fast, slow) = (p.period("fast"), p.period("slow"));
        require_ordered(Self::ID, ("fast", fast), ("slow", slow))?;
        Ok(Self { fast, slow })
    }
}

impl StrategyRule for MaCross {
    fn required_indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![Box::new(Sma::new(self.fast)), Box::new(Sma::new(self.slow))]
    }

    fn evaluate(&self, _bars: &[Bar], ind: &IndicatorValues, t: usize) -> Action {
        let fast = Sma::new(self.fast);
        let slow = Sma::new(self.slow);
        match line_cross(ind, fast.name(), slow.name(), t) {
            Cross::Up => Action::Enter,
            Cross::Down => Action::Exit,
            Cross::None => Action::Hold,
        }
    }
}
