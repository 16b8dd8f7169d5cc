//! Indicator trait and precomputed indicator values container.
//!
//! Indicators are pure functions: bar history in, series out. They are
//! computed once before the bar loop and looked up by name and index.

use crate::domain::Bar;
use std::collections::HashMap;

/// One value per bar; `None` marks the warm-up region (or any bar for which
/// the indicator is undefined). Warm-up values are never zero-filled.
pub type Series = Vec<Option<f64>>;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Stable key, e.g. "ma_20", "macd_dif_12_26_9".
    fn name(&self) -> &str;

    /// Number of leading bars that are `None`.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a series of the same length as `bars`.
    fn compute(&self, bars: &[Bar]) -> Series;
}

/// Container for precomputed indicator series keyed by indicator name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorValues {
    series: HashMap<String, Series>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named indicator series.
    pub fn insert(&mut self, name: impl Into<String>, values: Series) {
        self.series.insert(name.into(), values);
    }

    /// Value at a bar index; `None` if the series is missing, the index is
    /// out of range, or the bar is in the warm-up region.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied().flatten())
    }

    /// Current and previous value, both required to be defined.
    pub fn pair(&self, name: &str, bar_index: usize) -> Option<(f64, f64)> {
        if bar_index == 0 {
            return None;
        }
        Some((self.get(name, bar_index - 1)?, self.get(name, bar_index)?))
    }

    /// Value at the last bar of the named series.
    pub fn last(&self, name: &str) -> Option<f64> {
        self.series.get(name).and_then(|v| v.last().copied().flatten())
    }

    pub fn get_series(&self, name: &str) -> Option<&[Option<f64>]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    /// Names of all stored series, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.series.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of indicator series stored.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Compute every indicator and insert it under its own name.
    pub fn extend_from(&mut self, bars: &[Bar], indicators: &[Box<dyn Indicator>]) {
        for ind in indicators {
            if !self.series.contains_key(ind.name()) {
                self.series.insert(ind.name().to_string(), ind.compute(bars));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_distinguishes_warmup_and_missing() {
        let mut iv = IndicatorValues::new();
        iv.insert("ma_3", vec![None, None, Some(2.0), Some(3.0)]);
        assert_eq!(iv.get("ma_3", 0), None);
        assert_eq!(iv.get("ma_3", 2), Some(2.0));
        assert_eq!(iv.get("ma_3", 9), None);
        assert_eq!(iv.get("ma_5", 2), None);
        assert!(iv.contains("ma_3"));
        assert_eq!(iv.len(), 1);
    }

    #[test]
    fn pair_requires_both_bars() {
        let mut iv = IndicatorValues::new();
        iv.insert("x", vec![None, Some(1.0), Some(2.0)]);
        assert_eq!(iv.pair("x", 1), None);
        assert_eq!(iv.pair("x", 2), Some((1.0, 2.0)));
        assert_eq!(iv.pair("x", 0), None);
    }

    #[test]
    fn last_and_names() {
        let mut iv = IndicatorValues::new();
        iv.insert("b", vec![Some(1.0), Some(4.0)]);
        iv.insert("a", vec![None]);
        assert_eq!(iv.last("b"), Some(4.0));
        assert_eq!(iv.last("a"), None);
        assert_eq!(iv.names(), vec!["a", "b"]);
    }
}
