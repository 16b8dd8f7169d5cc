//! Trend dimension: moving-average alignment, price vs MA20, MA20 slope,
//! and a short linear-regression slope.

use super::component::Factor;
use super::context::{slope_key, ScoringContext, TREND_MA_PERIODS};
use crate::indicators::IndicatorParams;
use std::fmt;

const MA_SLOPE_BARS: usize = 5;
const MA_SLOPE_THRESHOLD: f64 = 0.02;
/// Regression slope threshold in percent of close per bar.
const REGRESSION_THRESHOLD_PCT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrendFactor {
    BullishAlignment,
    BearishAlignment,
    MixedAlignment,
    AboveMa20,
    BelowMa20,
    Ma20Rising(f64),
    Ma20Falling(f64),
    Ma20Flat,
    ShortUptrend(f64),
    ShortDowntrend(f64),
    Sideways,
}

impl Factor for TrendFactor {
    fn delta(&self) -> f64 {
        use TrendFactor::*;
        match self {
            BullishAlignment => 0.5,
            BearishAlignment => -0.5,
            AboveMa20 => 0.2,
            BelowMa20 => -0.2,
            Ma20Rising(_) => 0.2,
            Ma20Falling(_) => -0.2,
            ShortUptrend(_) => 0.3,
            ShortDowntrend(_) => -0.3,
            MixedAlignment | Ma20Flat | Sideways => 0.0,
        }
    }
}

impl fmt::Display for TrendFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TrendFactor::*;
        match self {
            BullishAlignment => f.write_str("moving averages in bullish alignment"),
            BearishAlignment => f.write_str("moving averages in bearish alignment"),
            MixedAlignment => f.write_str("moving averages intertwined"),
            AboveMa20 => f.write_str("price above MA20"),
            BelowMa20 => f.write_str("price below MA20"),
            Ma20Rising(pct) => write!(f, "MA20 rising ({:.1}% over 5 bars)", pct * 100.0),
            Ma20Falling(pct) => write!(f, "MA20 falling ({:.1}% over 5 bars)", pct * 100.0),
            Ma20Flat => f.write_str("MA20 flat"),
            ShortUptrend(pct) => write!(f, "short-term uptrend ({pct:.2}%/bar)"),
            ShortDowntrend(pct) => write!(f, "short-term downtrend ({pct:.2}%/bar)"),
            Sideways => f.write_str("short-term sideways"),
        }
    }
}

pub fn factors(ctx: &ScoringContext<'_>) -> Vec<TrendFactor> {
    let mut out = Vec::new();
    let ma20_key = IndicatorParams::ma_key(20);
    let mas: Option<Vec<f64>> = TREND_MA_PERIODS
        .iter()
        .map(|&p| ctx.now(&IndicatorParams::ma_key(p)))
        .collect();

    if let Some(m) = mas {
        if m[0] > m[1] && m[1] > m[2] && m[2] > m[3] {
            out.push(TrendFactor::BullishAlignment);
        } else if m[0] < m[1] && m[1] < m[2] && m[2] < m[3] {
            out.push(TrendFactor::BearishAlignment);
        } else {
            out.push(TrendFactor::MixedAlignment);
        }

        let close = ctx.close();
        if close > m[2] {
            out.push(TrendFactor::AboveMa20);
        } else if close < m[2] {
            out.push(TrendFactor::BelowMa20);
        }
    }

    if let (Some(now), Some(before)) = (ctx.now(&ma20_key), ctx.back(&ma20_key, MA_SLOPE_BARS)) {
        if before > 0.0 {
            let change = now / before - 1.0;
            out.push(if change > MA_SLOPE_THRESHOLD {
                TrendFactor::Ma20Rising(change)
            } else if change < -MA_SLOPE_THRESHOLD {
                TrendFactor::Ma20Falling(change)
            } else {
                TrendFactor::Ma20Flat
            });
        }
    }

    if let Some(slope) = ctx.now(&slope_key()) {
        let pct = slope / ctx.close() * 100.0;
        out.push(if pct > REGRESSION_THRESHOLD_PCT {
            TrendFactor::ShortUptrend(pct)
        } else if pct < -REGRESSION_THRESHOLD_PCT {
            TrendFactor::ShortDowntrend(pct)
        } else {
            TrendFactor::Sideways
        });
    }

    out
}
