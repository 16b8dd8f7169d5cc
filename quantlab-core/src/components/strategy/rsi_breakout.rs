//! RSI threshold breakout.
//!
//! Enter when RSI rises through the oversold level; exit when it falls back
//! through the overbought level. Both bars must have a defined RSI.

use super::params::{ParamSet, ParamSpec};
use super::{Action, StrategyRule};
use crate::components::indicator::{Indicator, IndicatorValues};
use crate::domain::Bar;
use crate::error::Result;
use crate::indicators::Rsi;

#[derive(Debug, Clone, PartialEq)]
pub struct RsiBreakout {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl RsiBreakout {
    pub const ID: &'static str = "rsi";
    pub const SCHEMA: &'static [ParamSpec] = &[
        ParamSpec::int("period", 14.0, 5.0, 50.0, "RSI period"),
        ParamSpec::float("oversold", 30.0, 10.0, 40.0, "oversold level"),
        ParamSpec::float("overbought", 70.0, 60.0, 90.0, "overbought level"),
    ];

    pub fn from_params(p: &ParamSet) -> Result<Self> {
        Ok(Self {
            period: p.period("period"),
            oversold: p.get("oversold"),
            overbought: p.get("overbought"),
        })
    }
}

impl StrategyRule for RsiBreakout {
    fn required_indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![Box::new(Rsi::new(self.period))]
    }

    fn evaluate(&self, _bars: &[Bar], ind: &IndicatorValues, t: usize) -> Action {
        let Some((prev, cur)) = ind.pair(Rsi::new(self.period).name(), t) else {
            return Action::Hold;
        };
        if cur < self.overbought && prev >= self.overbought {
            Action::Exit
        } else if cur > self.oversold && prev <= self.oversold {
            Action::Enter
        } else {
            Action::Hold
        }
    }
}
