//! Rolling realized volatility.
//!
//! Sample standard deviation of the last `period` one-bar simple returns,
//! annualized by sqrt(252).
//! Lookback: period (needs period + 1 closes).

use crate::components::indicator::{Indicator, Series};
use crate::domain::Bar;
use crate::stats::{sample_std, simple_returns};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone)]
pub struct RealizedVol {
    period: usize,
    name: String,
}

impl RealizedVol {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("vol_{period}"),
        }
    }
}

impl Indicator for RealizedVol {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let n = bars.len();
        let mut result = vec![None; n];
        if self.period < 2 || n <= self.period {
            return result;
        }
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let returns = simple_returns(&closes);
        // returns[i - 1] is the return into bar i
        for i in self.period..n {
            let window = &returns[i - self.period..i];
            result[i] = Some(sample_std(window) * TRADING_DAYS_PER_YEAR.sqrt());
        }
        result
    }
}
