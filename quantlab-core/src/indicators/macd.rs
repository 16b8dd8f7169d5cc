//! MACD: DIF, DEA and histogram.
//!
//! - DIF = EMA(close, fast) - EMA(close, slow)
//! - DEA = EMA(DIF, signal)
//! - Histogram = (DIF - DEA) * 2
//!
//! Each line is a separate Indicator instance sharing one computation.
//! DIF lookback: slow - 1. DEA/histogram lookback: slow + signal - 2.

use super::ema::ema_of_series;
use crate::components::indicator::{Indicator, Series};
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Dif,
    Dea,
    Hist,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        let prefix = match line {
            MacdLine::Dif => "macd_dif",
            MacdLine::Dea => "macd_dea",
            MacdLine::Hist => "macd_hist",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("{prefix}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn dif(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(fast, slow, signal, MacdLine::Dif)
    }

    pub fn dea(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(fast, slow, signal, MacdLine::Dea)
    }

    pub fn hist(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(fast, slow, signal, MacdLine::Hist)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let dif = self.fast.max(self.slow).saturating_sub(1);
        match self.line {
            MacdLine::Dif => dif,
            MacdLine::Dea | MacdLine::Hist => dif + self.signal.saturating_sub(1),
        }
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let (dif, dea, hist) = macd_lines(bars, self.fast, self.slow, self.signal);
        match self.line {
            MacdLine::Dif => dif,
            MacdLine::Dea => dea,
            MacdLine::Hist => hist,
        }
    }
}

/// Compute all three MACD lines at once.
pub fn macd_lines(bars: &[Bar], fast: usize, slow: usize, signal: usize) -> (Series, Series, Series) {
    let closes: Series = bars.iter().map(|b| Some(b.close)).collect();
    let ema_fast = ema_of_series(&closes, fast);
    let ema_slow = ema_of_series(&closes, slow);

    let dif: Series = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let dea = ema_of_series(&dif, signal);
    let hist: Series = dif
        .iter()
        .zip(&dea)
        .map(|(d, e)| Some(((*d)? - (*e)?) * 2.0))
        .collect();
    (dif, dea, hist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn warmup_lengths() {
        let bars = make_bars(&ramp(60));
        let dif = Macd::dif(12, 26, 9).compute(&bars);
        let dea = Macd::dea(12, 26, 9).compute(&bars);
        let hist = Macd::hist(12, 26, 9).compute(&bars);

        assert!(dif[..25].iter().all(Option::is_none));
        assert!(dif[25].is_some());
        assert!(dea[..33].iter().all(Option::is_none));
        assert!(dea[33].is_some());
        assert!(hist[..33].iter().all(Option::is_none));
        assert!(hist[33].is_some());
        assert_eq!(Macd::dea(12, 26, 9).lookback(), 33);
    }

    #[test]
    fn constant_series_is_zero() {
        let bars = make_bars(&[50.0; 60]);
        let (dif, dea, hist) = macd_lines(&bars, 12, 26, 9);
        assert_approx(dif[59].unwrap(), 0.0, DEFAULT_EPSILON);
        assert_approx(dea[59].unwrap(), 0.0, DEFAULT_EPSILON);
        assert_approx(hist[59].unwrap(), 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn histogram_is_twice_dif_minus_dea() {
        let bars = make_bars(&ramp(80));
        let (dif, dea, hist) = macd_lines(&bars, 12, 26, 9);
        for i in 33..80 {
            let expected = (dif[i].unwrap() - dea[i].unwrap()) * 2.0;
            assert_approx(hist[i].unwrap(), expected, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn rising_series_has_positive_dif() {
        let bars = make_bars(&ramp(60));
        let dif = Macd::dif(12, 26, 9).compute(&bars);
        assert!(dif[59].unwrap() > 0.0);
    }

    #[test]
    fn names_encode_parameters() {
        assert_eq!(Macd::dif(12, 26, 9).name(), "macd_dif_12_26_9");
        assert_eq!(Macd::hist(5, 10, 3).name(), "macd_hist_5_10_3");
    }
}
