//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR is the simple mean of the last `period` true ranges.
//! Lookback: period - 1 (TR[0] uses high-low only).

use super::sma::sma_of_series;
use crate::components::indicator::{Indicator, Series};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// Compute the True Range series from bars.
/// TR[0] = high[0] - low[0] (no previous close).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, b)| {
            let hl = b.high - b.low;
            if i == 0 {
                return hl;
            }
            let pc = bars[i - 1].close;
            hl.max((b.high - pc).abs()).max((b.low - pc).abs())
        })
        .collect()
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        sma_of_series(&true_range(bars), self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn true_range_uses_gap() {
        let mut bars = make_bars(&[10.0, 10.0]);
        // Gap up: prev close 10, today 14..15
        bars[1].high = 15.0;
        bars[1].low = 14.0;
        bars[1].close = 14.5;
        let tr = true_range(&bars);
        assert_approx(tr[0], bars[0].high - bars[0].low, DEFAULT_EPSILON);
        assert_approx(tr[1], 5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_series_atr_is_constant_range() {
        // make_bars pads high/low by 1.0 each side
        let bars = make_bars(&[10.0; 20]);
        let atr = Atr::new(14).compute(&bars);
        assert_eq!(atr[12], None);
        assert_approx(atr[13].unwrap(), 2.0, DEFAULT_EPSILON);
        assert_approx(atr[19].unwrap(), 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_range_bars_give_zero_atr() {
        let mut bars = make_bars(&[10.0; 20]);
        for b in &mut bars {
            b.high = 10.0;
            b.low = 10.0;
        }
        let atr = Atr::new(14).compute(&bars);
        assert_approx(atr[19].unwrap(), 0.0, DEFAULT_EPSILON);
    }
}
