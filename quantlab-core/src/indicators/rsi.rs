//! Relative Strength Index (RSI).
//!
//! Wilder smoothing of average gains and average losses:
//! seed = simple mean of the first `period` changes, then
//! avg[t] = (avg[t-1] * (period - 1) + x[t]) / period.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss).
//! Lookback: period.
//! Edge cases: avg_loss == 0 → 100; no movement at all → 50.

use crate::components::indicator::{Indicator, Series};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let n = bars.len();
        let mut result = vec![None; n];
        if self.period == 0 || n < self.period + 1 {
            return result;
        }

        let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;
        for &ch in &changes[..self.period] {
            if ch > 0.0 {
                avg_gain += ch;
            } else {
                avg_loss -= ch;
            }
        }
        avg_gain /= self.period as f64;
        avg_loss /= self.period as f64;
        result[self.period] = Some(compute_rsi(avg_gain, avg_loss));

        let p = self.period as f64;
        for i in (self.period + 1)..n {
            let ch = changes[i - 1];
            avg_gain = (avg_gain * (p - 1.0) + ch.max(0.0)) / p;
            avg_loss = (avg_loss * (p - 1.0) + (-ch).max(0.0)) / p;
            result[i] = Some(compute_rsi(avg_gain, avg_loss));
        }
        result
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
