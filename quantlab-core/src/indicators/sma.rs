//! Simple Moving Average (MA) of close.
//!
//! MA[t] = mean(close[t-period+1..=t]).
//! Lookback: period - 1.

use crate::components::indicator::{Indicator, Series};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("ma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        sma_of_series(&closes, self.period)
    }
}

/// Rolling simple mean over a raw slice, using a running sum.
pub fn sma_of_series(values: &[f64], period: usize) -> Series {
    let n = values.len();
    let mut result = vec![None; n];
    if period == 0 || n < period {
        return result;
    }

    let mut sum: f64 = values[..period].iter().sum();
    result[period - 1] = Some(sum / period as f64);
    for i in period..n {
        sum += values[i] - values[i - period];
        result[i] = Some(sum / period as f64);
    }
    result
}
