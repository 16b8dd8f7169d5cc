//! Momentum dimension: 5-bar return and its acceleration, 10-bar rate of
//! change, and the 20-bar return.

use super::component::Factor;
use super::context::{roc_key, ScoringContext, LONG_RETURN_BARS, ROC_BARS, SHORT_RETURN_BARS};
use std::fmt;

const SHORT_RETURN_THRESHOLD: f64 = 0.05;
const ROC_THRESHOLD: f64 = 0.10;
const LONG_RETURN_THRESHOLD: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MomentumFactor {
    StrongShortGain(f64),
    StrongShortLoss(f64),
    Accelerating,
    Decelerating,
    RocHigh(f64),
    RocLow(f64),
    LongGain(f64),
    LongLoss(f64),
}

impl Factor for MomentumFactor {
    fn delta(&self) -> f64 {
        use MomentumFactor::*;
        match self {
            StrongShortGain(_) => 0.3,
            StrongShortLoss(_) => -0.3,
            Accelerating => 0.2,
            Decelerating => -0.2,
            RocHigh(_) => 0.2,
            RocLow(_) => -0.2,
            LongGain(_) => 0.1,
            LongLoss(_) => -0.1,
        }
    }
}

impl fmt::Display for MomentumFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use MomentumFactor::*;
        match self {
            StrongShortGain(r) => write!(f, "5-day gain {:.1}%", r * 100.0),
            StrongShortLoss(r) => write!(f, "5-day loss {:.1}%", r * 100.0),
            Accelerating => f.write_str("upside momentum accelerating"),
            Decelerating => f.write_str("downside momentum accelerating"),
            RocHigh(r) => write!(f, "10-day rate of change {:.1}%", r * 100.0),
            RocLow(r) => write!(f, "10-day rate of change {:.1}%", r * 100.0),
            LongGain(r) => write!(f, "20-day gain {:.1}%", r * 100.0),
            LongLoss(r) => write!(f, "20-day loss {:.1}%", r * 100.0),
        }
    }
}

pub fn factors(ctx: &ScoringContext<'_>) -> Vec<MomentumFactor> {
    let mut out = Vec::new();
    let short_key = roc_key(SHORT_RETURN_BARS);

    if let Some(r5) = ctx.now(&short_key) {
        if r5 > SHORT_RETURN_THRESHOLD {
            out.push(MomentumFactor::StrongShortGain(r5));
        } else if r5 < -SHORT_RETURN_THRESHOLD {
            out.push(MomentumFactor::StrongShortLoss(r5));
        }
        // Compare with the preceding, non-overlapping 5-bar window.
        if let Some(prev) = ctx.back(&short_key, SHORT_RETURN_BARS) {
            if r5 > 0.0 && r5 > prev {
                out.push(MomentumFactor::Accelerating);
            } else if r5 < 0.0 && r5 < prev {
                out.push(MomentumFactor::Decelerating);
            }
        }
    }

    if let Some(roc) = ctx.now(&roc_key(ROC_BARS)) {
        if roc > ROC_THRESHOLD {
            out.push(MomentumFactor::RocHigh(roc));
        } else if roc < -ROC_THRESHOLD {
            out.push(MomentumFactor::RocLow(roc));
        }
    }

    if let Some(r20) = ctx.now(&roc_key(LONG_RETURN_BARS)) {
        if r20 > LONG_RETURN_THRESHOLD {
            out.push(MomentumFactor::LongGain(r20));
        } else if r20 < -LONG_RETURN_THRESHOLD {
            out.push(MomentumFactor::LongLoss(r20));
        }
    }

    out
}
