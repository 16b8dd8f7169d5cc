//! Indicator lookups at the evaluation bar for the scoring dimensions.

use crate::components::indicator::{Indicator, IndicatorValues};
use crate::domain::Bar;
use crate::error::{QuantError, Result};
use crate::indicators::{IndicatorParams, LinRegSlope, RealizedVol, Roc, Sma, VolumeRatio};

pub const SHORT_RETURN_BARS: usize = 5;
pub const ROC_BARS: usize = 10;
pub const LONG_RETURN_BARS: usize = 20;
pub const VOL_WINDOW: usize = 20;
pub const VOLUME_WINDOW: usize = 20;
pub const REGRESSION_WINDOW: usize = 20;
pub const TREND_MA_PERIODS: [usize; 4] = [5, 10, 20, 60];

/// Evaluation context for the last bar of a series.
///
/// Indicators supplied by the caller are used as-is; anything a dimension
/// needs that was not supplied is computed here from the bars.
pub struct ScoringContext<'a> {
    pub bars: &'a [Bar],
    pub t: usize,
    pub params: &'a IndicatorParams,
    supplied: &'a IndicatorValues,
    computed: IndicatorValues,
}

impl<'a> ScoringContext<'a> {
    pub fn new(bars: &'a [Bar], supplied: &'a IndicatorValues, params: &'a IndicatorParams) -> Result<Self> {
        let mut needed = params.indicators();
        for p in TREND_MA_PERIODS {
            needed.push(Box::new(Sma::new(p)));
        }
        needed.push(Box::new(Roc::new(SHORT_RETURN_BARS)));
        needed.push(Box::new(Roc::new(ROC_BARS)));
        needed.push(Box::new(Roc::new(LONG_RETURN_BARS)));
        needed.push(Box::new(RealizedVol::new(VOL_WINDOW)));
        needed.push(Box::new(VolumeRatio::new(VOLUME_WINDOW)));
        needed.push(Box::new(LinRegSlope::new(REGRESSION_WINDOW)));

        let mut missing: Vec<Box<dyn Indicator>> = Vec::new();
        for ind in needed {
            match supplied.get_series(ind.name()) {
                Some(series) if series.len() != bars.len() => {
                    return Err(QuantError::invalid(format!(
                        "indicator '{}' has {} values for {} bars",
                        ind.name(),
                        series.len(),
                        bars.len()
                    )));
                }
                Some(_) => {}
                None => missing.push(ind),
            }
        }
        let mut computed = IndicatorValues::new();
        computed.extend_from(bars, &missing);

        Ok(Self {
            bars,
            t: bars.len().saturating_sub(1),
            params,
            supplied,
            computed,
        })
    }

    /// Value of `key` at bar index `idx`.
    pub fn at(&self, key: &str, idx: usize) -> Option<f64> {
        if self.supplied.contains(key) {
            self.supplied.get(key, idx)
        } else {
            self.computed.get(key, idx)
        }
    }

    /// Value of `key` at the evaluation bar.
    pub fn now(&self, key: &str) -> Option<f64> {
        self.at(key, self.t)
    }

    /// Value of `key` `back` bars before the evaluation bar.
    pub fn back(&self, key: &str, back: usize) -> Option<f64> {
        self.t.checked_sub(back).and_then(|i| self.at(key, i))
    }

    pub fn close(&self) -> f64 {
        self.bars[self.t].close
    }

    pub fn prev_close(&self) -> Option<f64> {
        self.t.checked_sub(1).map(|i| self.bars[i].close)
    }
}

/// Name helpers for the fixed supplemental indicators.
pub fn roc_key(bars: usize) -> String {
    Roc::new(bars).name().to_string()
}

pub fn vol_key() -> String {
    RealizedVol::new(VOL_WINDOW).name().to_string()
}

pub fn volume_ratio_key() -> String {
    VolumeRatio::new(VOLUME_WINDOW).name().to_string()
}

pub fn slope_key() -> String {
    LinRegSlope::new(REGRESSION_WINDOW).name().to_string()
}
