//! Rolling least-squares slope of close against bar index.
//! Units: price per bar. Lookback: period - 1.

use crate::components::indicator::{Indicator, Series};
use crate::domain::Bar;
use crate::stats::linear_regression;

#[derive(Debug, Clone)]
pub struct LinRegSlope {
    period: usize,
    name: String,
}

impl LinRegSlope {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("linreg_slope_{period}"),
        }
    }
}

impl Indicator for LinRegSlope {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let n = bars.len();
        let mut result = vec![None; n];
        if self.period < 2 || n < self.period {
            return result;
        }
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        for i in (self.period - 1)..n {
            result[i] = linear_regression(&closes[i + 1 - self.period..=i]).map(|(slope, _)| slope);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn slope_of_ramp() {
        let closes: Vec<f64> = (0..30).map(|i| 50.0 + 2.0 * i as f64).collect();
        let bars = make_bars(&closes);
        let slope = LinRegSlope::new(20).compute(&bars);
        assert_eq!(slope[18], None);
        assert_approx(slope[19].unwrap(), 2.0, 1e-9);
        assert_approx(slope[29].unwrap(), 2.0, 1e-9);
    }
}
