//! MACD histogram flip: enter when the histogram turns positive, exit when
//! it turns negative.

use super::macd_cross::{parse_macd, MACD_SCHEMA};
use super::params::{ParamSet, ParamSpec};
use super::{zero_cross, Action, Cross, StrategyRule};
use crate::components::indicator::{Indicator, IndicatorValues};
use crate::domain::Bar;
use crate::error::Result;
use crate::indicators::Macd;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdHist {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl MacdHist {
    pub const ID: &'static str = "macd_hist";
    pub const SCHEMA: &'static [ParamSpec] = MACD_SCHEMA;

    pub fn from_params(p: &ParamSet) -> Result<Self> {
        let (fast, slow, signal) = parse_macd(Self::ID, p)?;
        Ok(Self { fast, slow, signal })
    }
}

impl StrategyRule for MacdHist {
    fn required_indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![Box::new(Macd::hist(self.fast, self.slow, self.signal))]
    }

    fn evaluate(&self, _bars: &[Bar], ind: &IndicatorValues, t: usize) -> Action {
        let hist = Macd::hist(self.fast, self.slow, self.signal);
        match zero_cross(ind, hist.name(), t) {
            Cross::Up => Action::Enter,
            Cross::Down => Action::Exit,
            Cross::None => Action::Hold,
        }
    }
}
