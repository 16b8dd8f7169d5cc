//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2/(n+1).
//! Seed: simple mean of the first `period` available values.
//! Lookback: period - 1 (for a fully defined input).

use crate::components::indicator::{Indicator, Series};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let closes: Series = bars.iter().map(|b| Some(b.close)).collect();
        ema_of_series(&closes, self.period)
    }
}

/// EMA of an arbitrary series that may carry a leading warm-up region.
///
/// The seed is the mean of the first `period` defined values following the
/// leading `None`s. A `None` after the seed taints the rest of the output.
/// Used by MACD (EMA of DIF) and KDJ (EMA of RSV, EMA of K).
pub fn ema_of_series(values: &[Option<f64>], period: usize) -> Series {
    let n = values.len();
    let mut result = vec![None; n];
    if period == 0 {
        return result;
    }

    let start = match values.iter().position(Option::is_some) {
        Some(s) => s,
        None => return result,
    };
    let seed_end = start + period - 1;
    if seed_end >= n {
        return result;
    }

    let mut sum = 0.0;
    for v in &values[start..=seed_end] {
        match v {
            Some(x) => sum += x,
            None => return result,
        }
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = sum / period as f64;
    result[seed_end] = Some(prev);
    for i in (seed_end + 1)..n {
        match values[i] {
            Some(x) => {
                prev = alpha * x + (1.0 - alpha) * prev;
                result[i] = Some(prev);
            }
            None => break,
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&bars);
        assert_approx(result[0].unwrap(), 100.0, DEFAULT_EPSILON);
        assert_approx(result[2].unwrap(), 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed at index 2 = mean(10, 11, 12) = 11
        // EMA[3] = 0.5*13 + 0.5*11 = 12, EMA[4] = 0.5*14 + 0.5*12 = 13
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Ema::new(3).compute(&bars);
        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert_approx(result[2].unwrap(), 11.0, DEFAULT_EPSILON);
        assert_approx(result[3].unwrap(), 12.0, DEFAULT_EPSILON);
        assert_approx(result[4].unwrap(), 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_of_series_skips_leading_warmup() {
        let values = vec![None, None, Some(2.0), Some(4.0), Some(6.0)];
        let result = ema_of_series(&values, 2);
        assert_eq!(&result[..3], &[None, None, None]);
        // seed = mean(2, 4) = 3 at index 3; alpha = 2/3
        assert_approx(result[3].unwrap(), 3.0, DEFAULT_EPSILON);
        assert_approx(result[4].unwrap(), 2.0 / 3.0 * 6.0 + 1.0 / 3.0 * 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_of_series_all_absent() {
        assert!(ema_of_series(&[None, None], 2).iter().all(Option::is_none));
    }

    #[test]
    fn ema_lookback() {
        assert_eq!(Ema::new(20).lookback(), 19);
        assert_eq!(Ema::new(1).lookback(), 0);
    }
}
