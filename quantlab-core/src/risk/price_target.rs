//! Reference price levels and bullish/bearish targets.
//!
//! Levels come from Bollinger bands, the 52-week range and its Fibonacci
//! retracements, the standard moving averages, and a 60-bar linear trend.

use crate::components::indicator::Indicator;
use crate::domain::{closes, validate_bars, Bar};
use crate::error::{require_bars, QuantError, Result};
use crate::indicators::{Bollinger, Sma};
use crate::stats::linear_regression;
use serde::{Deserialize, Serialize};

pub const MIN_TARGET_BARS: usize = 120;
const YEAR_BARS: usize = 252;
const TREND_BARS: usize = 60;
pub const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSet {
    pub conservative: f64,
    pub moderate: f64,
    pub aggressive: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalLevels {
    pub boll_upper: f64,
    pub boll_lower: f64,
    pub ma5: f64,
    pub ma10: f64,
    pub ma20: f64,
    pub ma60: f64,
    pub high_52w: f64,
    pub low_52w: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibLevel {
    pub ratio: f64,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub direction: TrendDirection,
    /// |slope| as a percentage of the current price.
    pub strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTargets {
    pub current_price: f64,
    pub forward_days: usize,
    pub bullish: TargetSet,
    pub bearish: TargetSet,
    pub trend_target: f64,
    pub levels: TechnicalLevels,
    pub fibonacci: Vec<FibLevel>,
    pub fib_support: f64,
    pub fib_resistance: f64,
    pub trend: TrendLine,
}

fn last_value(ind: &dyn Indicator, bars: &[Bar]) -> Result<f64> {
    ind.compute(bars)
        .last()
        .copied()
        .flatten()
        .ok_or_else(|| QuantError::invalid(format!("{} undefined at the last bar", ind.name())))
}

pub fn estimate_price_targets(bars: &[Bar], forward_days: usize) -> Result<PriceTargets> {
    if forward_days == 0 {
        return Err(QuantError::invalid("forward_days must be >= 1"));
    }
    validate_bars(bars)?;
    require_bars("price targets", MIN_TARGET_BARS, bars.len())?;

    let prices = closes(bars);
    let price = prices[prices.len() - 1];

    let year = &bars[bars.len().saturating_sub(YEAR_BARS)..];
    let high_52w = year.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low_52w = year.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let range = high_52w - low_52w;

    let fibonacci: Vec<FibLevel> = FIB_RATIOS
        .iter()
        .map(|&ratio| FibLevel {
            ratio,
            price: low_52w + range * ratio,
        })
        .collect();
    let fib_support = fibonacci
        .iter()
        .map(|l| l.price)
        .filter(|p| *p < price)
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))))
        .unwrap_or(low_52w);
    let fib_resistance = fibonacci
        .iter()
        .map(|l| l.price)
        .filter(|p| *p > price)
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.min(p))))
        .unwrap_or(high_52w);

    let levels = TechnicalLevels {
        boll_upper: last_value(&Bollinger::upper(20, 2.0), bars)?,
        boll_lower: last_value(&Bollinger::lower(20, 2.0), bars)?,
        ma5: last_value(&Sma::new(5), bars)?,
        ma10: last_value(&Sma::new(10), bars)?,
        ma20: last_value(&Sma::new(20), bars)?,
        ma60: last_value(&Sma::new(60), bars)?,
        high_52w,
        low_52w,
    };

    let recent = &prices[prices.len() - TREND_BARS..];
    let (slope, intercept) = linear_regression(recent)
        .ok_or_else(|| QuantError::invalid("trend regression needs at least 2 closes"))?;
    let trend_target = intercept + slope * (TREND_BARS + forward_days) as f64;

    Ok(PriceTargets {
        current_price: price,
        forward_days,
        bullish: TargetSet {
            conservative: levels.boll_upper.min(fib_resistance),
            moderate: fib_resistance,
            aggressive: high_52w,
        },
        bearish: TargetSet {
            conservative: levels.boll_lower.max(fib_support),
            moderate: fib_support,
            aggressive: low_52w,
        },
        trend_target,
        levels,
        fibonacci,
        fib_support,
        fib_resistance,
        trend: TrendLine {
            slope,
            direction: if slope > 0.0 { TrendDirection::Up } else { TrendDirection::Down },
            strength: slope.abs() / price * 100.0,
        },
    })
}
