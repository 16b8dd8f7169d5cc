//! Rate of Change (ROC).
//!
//! ROC = close[t] / close[t - period] - 1, as a fraction.
//! The 5- and 20-bar simple returns used by momentum scoring are ROC(5) and ROC(20).
//! Lookback: period.

use crate::components::indicator::{Indicator, Series};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
    name: String,
}

impl Roc {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("roc_{period}"),
        }
    }
}

impl Indicator for Roc {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let n = bars.len();
        let mut result = vec![None; n];
        if self.period == 0 {
            return result;
        }
        for i in self.period..n {
            let base = bars[i - self.period].close;
            if base > 0.0 {
                result[i] = Some(bars[i].close / base - 1.0);
            }
        }
        result
    }
}
