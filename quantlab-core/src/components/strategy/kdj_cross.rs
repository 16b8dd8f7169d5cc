//! KDJ cross.
//!
//! Enter when K crosses above D from below 50; exit when K crosses below D
//! from above 50.

use super::params::{ParamSet, ParamSpec};
use super::{Action, StrategyRule};
use crate::components::indicator::{Indicator, IndicatorValues};
use crate::domain::Bar;
use crate::error::Result;
use crate::indicators::Kdj;

#[derive(Debug, Clone, PartialEq)]
pub struct KdjCross {
    pub n: usize,
    pub m1: usize,
    pub m2: usize,
}

impl KdjCross {
    pub const ID: &'static str = "kdj";
    pub const SCHEMA: &'static [ParamSpec] = &[
        ParamSpec::int("n", 9.0, 5.0, 30.0, "RSV window"),
        ParamSpec::int("m1", 3.0, 2.0, 10.0, "K smoothing period"),
        ParamSpec::int("m2", 3.0, 2.0, 10.0, "D smoothing period"),
    ];

    pub fn from_params(p: &ParamSet) -> Result<Self> {
        Ok(Self {
            n: p.period("n"),
            m1: p.period("m1"),
            m2: p.period("m2"),
        })
    }
}

impl StrategyRule for KdjCross {
    fn required_indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Kdj::k(self.n, self.m1, self.m2)),
            Box::new(Kdj::d(self.n, self.m1, self.m2)),
        ]
    }

    fn evaluate(&self, _bars: &[Bar], ind: &IndicatorValues, t: usize) -> Action {
        let k = ind.pair(Kdj::k(self.n, self.m1, self.m2).name(), t);
        let d = ind.pair(Kdj::d(self.n, self.m1, self.m2).name(), t);
        let (Some((pk, k)), Some((pd, d))) = (k, d) else {
            return Action::Hold;
        };
        if k < d && pk >= pd && pk > 50.0 {
            Action::Exit
        } else if k > d && pk <= pd && pk < 50.0 {
            Action::Enter
        } else {
            Action::Hold
        }
    }
}
