//! Volatility and tail-risk estimation from the close history.
//!
//! Forward price intervals follow the square-root-of-time rule under a
//! normal approximation; VaR and CVaR are historical (empirical quantile).

pub mod price_target;

pub use price_target::{estimate_price_targets, PriceTargets, TrendDirection, MIN_TARGET_BARS};

use crate::domain::{closes, validate_bars, Bar};
use crate::error::{require_bars, QuantError, Result};
use crate::indicators::{Atr, TRADING_DAYS_PER_YEAR};
use crate::components::indicator::Indicator;
use crate::stats::{max_drawdown, mean, quantile, sample_std, simple_returns};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_RISK_BARS: usize = 60;
/// Smallest explicit volatility window, in returns.
pub const MIN_VOL_WINDOW: usize = 20;
const RECENT_BARS: usize = 20;
const ATR_PERIOD: usize = 14;
const VAR_QUANTILE: f64 = 0.05;

/// Two-sided normal z-score for a supported confidence level.
pub fn z_score(level: f64) -> Result<f64> {
    const TABLE: [(f64, f64); 4] = [(0.68, 1.0), (0.90, 1.645), (0.95, 1.96), (0.99, 2.576)];
    TABLE
        .iter()
        .find(|(l, _)| (l - level).abs() < 1e-9)
        .map(|&(_, z)| z)
        .ok_or_else(|| {
            QuantError::invalid(format!(
                "unsupported confidence level {level}; expected one of 0.68, 0.90, 0.95, 0.99"
            ))
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub forward_days: usize,
    pub confidence_levels: Vec<f64>,
    /// Trailing window of returns for daily volatility; `None` uses the full history.
    pub vol_window: Option<usize>,
    pub drawdown_window: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            forward_days: 5,
            confidence_levels: vec![0.68, 0.95],
            vol_window: None,
            drawdown_window: 20,
        }
    }
}

impl RiskConfig {
    pub fn with_forward_days(forward_days: usize) -> Self {
        Self {
            forward_days,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.forward_days == 0 {
            return Err(QuantError::invalid("forward_days must be >= 1"));
        }
        if let Some(w) = self.vol_window {
            if w < MIN_VOL_WINDOW {
                return Err(QuantError::invalid(format!(
                    "vol_window must be >= {MIN_VOL_WINDOW} returns, got {w}"
                )));
            }
        }
        if self.drawdown_window < 2 {
            return Err(QuantError::invalid("drawdown_window must be >= 2"));
        }
        for &level in &self.confidence_levels {
            z_score(level)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
}

impl VolatilityLevel {
    pub fn from_annualized(vol: f64) -> Self {
        if vol > 0.4 {
            VolatilityLevel::High
        } else if vol > 0.2 {
            VolatilityLevel::Medium
        } else {
            VolatilityLevel::Low
        }
    }
}

impl fmt::Display for VolatilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VolatilityLevel::Low => "low",
            VolatilityLevel::Medium => "medium",
            VolatilityLevel::High => "high",
        })
    }
}

/// Volatility figures as fractions (0.02 = 2%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityEstimate {
    pub daily: f64,
    pub annualized: f64,
    pub forward: f64,
    /// 5-bar volatility scaled to the 5-bar horizon.
    pub vol_5d: f64,
    /// 20-bar volatility scaled to the 20-bar horizon.
    pub vol_20d: f64,
    pub level: VolatilityLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub confidence: f64,
    pub lower: f64,
    pub upper: f64,
    /// Interval width as a percentage of the current price.
    pub range_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub daily_vol: f64,
    pub annualized_vol: f64,
    pub forward_vol: f64,
    pub var_95: f64,
    pub cvar_95: f64,
    pub max_drawdown_window: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEstimate {
    pub current_price: f64,
    pub forward_days: usize,
    pub volatility: VolatilityEstimate,
    pub price_ranges: Vec<PriceRange>,
    pub var_95: f64,
    pub cvar_95: f64,
    pub max_drawdown: f64,
    pub expected_price: f64,
    pub expected_return: f64,
    pub support: f64,
    pub resistance: f64,
    pub atr: f64,
    pub atr_pct: f64,
    pub profile: RiskProfile,
}

/// Forward price interval at `level` around `price`.
pub fn price_range(price: f64, forward_vol: f64, level: f64) -> Result<PriceRange> {
    let z = z_score(level)?;
    Ok(PriceRange {
        confidence: level,
        lower: (price * (1.0 - z * forward_vol)).max(0.0),
        upper: price * (1.0 + z * forward_vol),
        range_pct: 2.0 * z * forward_vol * 100.0,
    })
}

/// Historical 95% VaR and CVaR of `returns`, as (var, cvar).
///
/// VaR is the 5th percentile; CVaR is the mean of the returns at or below it.
pub fn value_at_risk(returns: &[f64]) -> Option<(f64, f64)> {
    let var = quantile(returns, VAR_QUANTILE)?;
    let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var).collect();
    let cvar = if tail.is_empty() { var } else { mean(&tail) };
    Some((var, cvar))
}

fn tail<T>(values: &[T], n: usize) -> &[T] {
    &values[values.len().saturating_sub(n)..]
}

pub fn estimate_risk(bars: &[Bar], config: &RiskConfig) -> Result<RiskEstimate> {
    config.validate()?;
    validate_bars(bars)?;
    require_bars("risk estimate", MIN_RISK_BARS, bars.len())?;

    let prices = closes(bars);
    let returns = simple_returns(&prices);
    let price = prices[prices.len() - 1];

    let vol_sample = match config.vol_window {
        Some(w) => tail(&returns, w),
        None => &returns[..],
    };
    let daily = sample_std(vol_sample);
    let annualized = daily * TRADING_DAYS_PER_YEAR.sqrt();
    let forward = daily * (config.forward_days as f64).sqrt();

    let volatility = VolatilityEstimate {
        daily,
        annualized,
        forward,
        vol_5d: sample_std(tail(&returns, 5)) * 5f64.sqrt(),
        vol_20d: sample_std(tail(&returns, 20)) * 20f64.sqrt(),
        level: VolatilityLevel::from_annualized(annualized),
    };

    let price_ranges = config
        .confidence_levels
        .iter()
        .map(|&level| price_range(price, forward, level))
        .collect::<Result<Vec<_>>>()?;

    let (var_95, cvar_95) = value_at_risk(&returns).ok_or(QuantError::InsufficientData {
        feature: "value at risk",
        required: 2,
        actual: bars.len(),
    })?;
    let max_dd = max_drawdown(tail(&prices, config.drawdown_window));

    let expected_return = mean(tail(&returns, RECENT_BARS)) * config.forward_days as f64;
    let recent = tail(bars, RECENT_BARS);
    let support = recent.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let resistance = recent.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);

    let atr = Atr::new(ATR_PERIOD)
        .compute(bars)
        .last()
        .copied()
        .flatten()
        .unwrap_or(0.0);

    Ok(RiskEstimate {
        current_price: price,
        forward_days: config.forward_days,
        price_ranges,
        var_95,
        cvar_95,
        max_drawdown: max_dd,
        expected_price: price * (1.0 + expected_return),
        expected_return,
        support,
        resistance,
        atr,
        atr_pct: atr / price * 100.0,
        profile: RiskProfile {
            daily_vol: daily,
            annualized_vol: annualized,
            forward_vol: forward,
            var_95,
            cvar_95,
            max_drawdown_window: max_dd,
        },
        volatility,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::indicators::{assert_approx, make_bars};

    fn zigzag(n: usize) -> Vec<Bar> {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + if i % 2 == 0 { 0.0 } else { 2.0 } + i as f64 * 0.05)
            .collect();
        make_bars(&closes)
    }

    #[test]
    fn z_table() {
        assert_eq!(z_score(0.68).unwrap(), 1.0);
        assert_eq!(z_score(0.95).unwrap(), 1.96);
        assert_eq!(z_score(0.99).unwrap(), 2.576);
        assert!(z_score(0.5).is_err());
    }

    #[test]
    fn var_matches_closed_form_percentile() {
        // 21 returns -0.10, -0.09, ..., 0.10. Position 0.05 * 20 = 1.0 → -0.09.
        let returns: Vec<f64> = (0..21).map(|i| -0.10 + i as f64 * 0.01).collect();
        let (var, cvar) = value_at_risk(&returns).unwrap();
        assert_approx(var, -0.09, 1e-12);
        assert_approx(cvar, -0.095, 1e-12);
        assert!(cvar <= var);
    }

    #[test]
    fn var_interpolates_between_order_statistics() {
        // 11 returns: position 0.05 * 10 = 0.5, halfway between -0.05 and -0.04.
        let returns: Vec<f64> = (0..11).map(|i| -0.05 + i as f64 * 0.01).collect();
        let (var, cvar) = value_at_risk(&returns).unwrap();
        assert_approx(var, -0.045, 1e-12);
        assert_approx(cvar, -0.05, 1e-12);
    }

    #[test]
    fn intervals_widen_with_confidence() {
        let cfg = RiskConfig {
            confidence_levels: vec![0.68, 0.90, 0.95, 0.99],
            ..RiskConfig::default()
        };
        let est = estimate_risk(&zigzag(100), &cfg).unwrap();
        for pair in est.price_ranges.windows(2) {
            assert!(pair[1].lower < pair[0].lower);
            assert!(pair[1].upper > pair[0].upper);
        }
        for r in &est.price_ranges {
            assert!(r.lower <= est.current_price && est.current_price <= r.upper);
        }
    }

    #[test]
    fn forward_vol_scales_with_sqrt_time() {
        let bars = zigzag(100);
        let one = estimate_risk(&bars, &RiskConfig::with_forward_days(1)).unwrap();
        let four = estimate_risk(&bars, &RiskConfig::with_forward_days(4)).unwrap();
        assert_approx(four.volatility.forward, one.volatility.forward * 2.0, 1e-12);
        assert_approx(one.volatility.annualized, one.volatility.daily * 252f64.sqrt(), 1e-12);
    }

    #[test]
    fn flat_series_has_zero_risk() {
        let bars = make_bars(&[50.0; 80]);
        let est = estimate_risk(&bars, &RiskConfig::default()).unwrap();
        assert_eq!(est.volatility.daily, 0.0);
        assert_eq!(est.volatility.level, VolatilityLevel::Low);
        assert_eq!(est.var_95, 0.0);
        assert_eq!(est.max_drawdown, 0.0);
        assert_eq!(est.expected_price, 50.0);
        for r in &est.price_ranges {
            assert_eq!(r.lower, 50.0);
            assert_eq!(r.upper, 50.0);
        }
    }

    #[test]
    fn lower_bound_is_floored_at_zero() {
        let r = price_range(10.0, 0.6, 0.99).unwrap();
        assert_eq!(r.lower, 0.0);
        assert!(r.upper > 10.0);
    }

    #[test]
    fn drawdown_uses_trailing_window() {
        let mut closes = vec![100.0; 40];
        closes.extend([200.0, 100.0]);
        closes.extend(vec![100.0; 30]);
        let est = estimate_risk(&make_bars(&closes), &RiskConfig::default()).unwrap();
        // The 200 → 100 drop sits outside the last 20 closes.
        assert_eq!(est.max_drawdown, 0.0);
    }

    #[test]
    fn support_and_resistance_use_recent_bars() {
        let mut closes = vec![100.0; 40];
        closes.extend([200.0, 100.0]);
        closes.extend(vec![100.0; 30]);
        let est = estimate_risk(&make_bars(&closes), &RiskConfig::default()).unwrap();
        assert_eq!(est.support, 99.0);
        assert_eq!(est.resistance, 101.0);
    }

    #[test]
    fn rejects_short_history_and_bad_config() {
        let err = estimate_risk(&zigzag(59), &RiskConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);

        let cfg = RiskConfig {
            vol_window: Some(10),
            ..RiskConfig::default()
        };
        assert_eq!(estimate_risk(&zigzag(100), &cfg).unwrap_err().kind(), ErrorKind::InvalidInput);

        let cfg = RiskConfig {
            confidence_levels: vec![0.8],
            ..RiskConfig::default()
        };
        assert!(estimate_risk(&zigzag(100), &cfg).is_err());
    }

    #[test]
    fn support_and_resistance_bracket_recent_bars() {
        let est = estimate_risk(&zigzag(100), &RiskConfig::default()).unwrap();
        assert!(est.support <= est.current_price);
        assert!(est.resistance >= est.current_price);
        assert!(est.atr > 0.0);
    }
}
