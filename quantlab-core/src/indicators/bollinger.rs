//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! Three bands (separate Indicator instances):
//! - Middle: MA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use crate::components::indicator::{Indicator, Series};
use crate::domain::Bar;
use crate::stats::{mean, population_std};

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        let prefix = match band {
            BollingerBand::Upper => "boll_upper",
            BollingerBand::Middle => "boll_middle",
            BollingerBand::Lower => "boll_lower",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("{prefix}_{period}_{multiplier}"),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Lower)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let n = bars.len();
        let mut result = vec![None; n];
        if self.period == 0 || n < self.period {
            return result;
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        for i in (self.period - 1)..n {
            let window = &closes[i + 1 - self.period..=i];
            let mid = mean(window);
            result[i] = Some(match self.band {
                BollingerBand::Middle => mid,
                BollingerBand::Upper => mid + self.multiplier * population_std(window),
                BollingerBand::Lower => mid - self.multiplier * population_std(window),
            });
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn constant_series_collapses_bands() {
        let bars = make_bars(&[10.0; 25]);
        for ind in [
            Bollinger::upper(20, 2.0),
            Bollinger::middle(20, 2.0),
            Bollinger::lower(20, 2.0),
        ] {
            let result = ind.compute(&bars);
            assert_eq!(result[18], None);
            assert_approx(result[19].unwrap(), 10.0, DEFAULT_EPSILON);
            assert_approx(result[24].unwrap(), 10.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn known_population_std() {
        // window 2,4,4,4,5,5,7,9: mean 5, population std 2
        let bars = make_bars(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let upper = Bollinger::upper(8, 2.0).compute(&bars);
        let lower = Bollinger::lower(8, 2.0).compute(&bars);
        assert_approx(upper[7].unwrap(), 9.0, DEFAULT_EPSILON);
        assert_approx(lower[7].unwrap(), 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn names_and_lookback() {
        assert_eq!(Bollinger::upper(20, 2.0).name(), "boll_upper_20_2");
        assert_eq!(Bollinger::lower(20, 2.5).name(), "boll_lower_20_2.5");
        assert_eq!(Bollinger::middle(20, 2.0).lookback(), 19);
    }
}
