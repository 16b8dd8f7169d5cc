//! Bollinger mean reversion.
//!
//! Enter when the bar pierces the lower band but closes back above it; exit
//! when it pierces the upper band but closes back below it. Exit wins if a
//! single bar does both.

use super::params::{ParamSet, ParamSpec};
use super::{Action, StrategyRule};
use crate::components::indicator::{Indicator, IndicatorValues};
use crate::domain::Bar;
use crate::error::Result;
use crate::indicators::Bollinger;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerReversion {
    pub period: usize,
    pub std_dev: f64,
}

impl BollingerReversion {
    pub const ID: &'static str = "bollinger";
    pub const SCHEMA: &'static [ParamSpec] = &[
        ParamSpec::int("period", 20.0, 10.0, 50.0, "band window"),
        ParamSpec::float("std_dev", 2.0, 1.0, 3.0, "band width in standard deviations"),
    ];

    pub fn from_params(p: &ParamSet) -> Result<Self> {
        Ok(Self {
            period: p.period("period"),
            std_dev: p.get("std_dev"),
        })
    }
}

impl StrategyRule for BollingerReversion {
    fn required_indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Bollinger::upper(self.period, self.std_dev)),
            Box::new(Bollinger::lower(self.period, self.std_dev)),
        ]
    }

    fn evaluate(&self, bars: &[Bar], ind: &IndicatorValues, t: usize) -> Action {
        let upper = ind.get(Bollinger::upper(self.period, self.std_dev).name(), t);
        let lower = ind.get(Bollinger::lower(self.period, self.std_dev).name(), t);
        let (Some(upper), Some(lower)) = (upper, lower) else {
            return Action::Hold;
        };
        let bar = &bars[t];
        if bar.high >= upper && bar.close < upper {
            Action::Exit
        } else if bar.low <= lower && bar.close > lower {
            Action::Enter
        } else {
            Action::Hold
        }
    }
}
