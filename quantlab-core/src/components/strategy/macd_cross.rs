//! MACD line cross: enter when DIF crosses above DEA, exit when it crosses below.

use super::params::{require_ordered, ParamSet, ParamSpec};
use super::{line_cross, Action, Cross, StrategyRule};
use crate::components::indicator::{Indicator, IndicatorValues};
use crate::domain::Bar;
use crate::error::Result;
use crate::indicators::Macd;

/// Shared schema for both MACD variants.
pub(crate) const MACD_SCHEMA: &[ParamSpec] = &[
    ParamSpec::int("fast", 12.0, 5.0, 50.0, "fast EMA period"),
    ParamSpec::int("slow", 26.0, 10.0, 100.0, "slow EMA period"),
    ParamSpec::int("signal", 9.0, 3.0, 30.0, "signal (DEA) EMA period"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct MacdCross {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl MacdCross {
    pub const ID: &'static str = "macd";
    pub const SCHEMA: &'static [ParamSpec] = MACD_SCHEMA;

    pub fn from_params(p: &ParamSet) -> Result<Self> {
        let (fast, slow, signal) = parse_macd(Self::ID, p)?;
        Ok(Self { fast, slow, signal })
    }
}

pub(crate) fn parse_macd(id: &str, p: &ParamSet) -> Result<(usize, usize, usize)> {
    let (fast, slow) = (p.period("fast"), p.period("slow"));
    require_ordered(id, ("fast", fast), ("slow", slow))?;
    Ok((fast, slow, p.period("signal")))
}

impl StrategyRule for MacdCross {
    fn required_indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Macd::dif(self.fast, self.slow, self.signal)),
            Box::new(Macd::dea(self.fast, self.slow, self.signal)),
        ]
    }

    fn evaluate(&self, _bars: &[Bar], ind: &IndicatorValues, t: usize) -> Action {
        let dif = Macd::dif(self.fast, self.slow, self.signal);
        let dea = Macd::dea(self.fast, self.slow, self.signal);
        match line_cross(ind, dif.name(), dea.name(), t) {
            Cross::Up => Action::Enter,
            Cross::Down => Action::Exit,
            Cross::None => Action::Hold,
        }
    }
}
