//! Volatility dimension: level of 20-bar annualized realized volatility and
//! its change against the preceding 20-bar window.

use super::component::Factor;
use super::context::{vol_key, ScoringContext, VOL_WINDOW};
use std::fmt;

const HIGH_VOL: f64 = 0.50;
const LOW_VOL: f64 = 0.20;
const CONTRACTION_RATIO: f64 = 0.7;
const EXPANSION_RATIO: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolatilityFactor {
    HighVolatility(f64),
    LowVolatility(f64),
    Contracting,
    Expanding,
}

impl Factor for VolatilityFactor {
    fn delta(&self) -> f64 {
        match self {
            VolatilityFactor::HighVolatility(_) => -0.2,
            VolatilityFactor::LowVolatility(_) => 0.1,
            VolatilityFactor::Contracting => 0.1,
            VolatilityFactor::Expanding => -0.1,
        }
    }
}

impl fmt::Display for VolatilityFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolatilityFactor::HighVolatility(v) => write!(f, "high volatility ({:.0}% annualized)", v * 100.0),
            VolatilityFactor::LowVolatility(v) => write!(f, "low volatility ({:.0}% annualized)", v * 100.0),
            VolatilityFactor::Contracting => f.write_str("volatility contracting"),
            VolatilityFactor::Expanding => f.write_str("volatility expanding"),
        }
    }
}

pub fn factors(ctx: &ScoringContext<'_>) -> Vec<VolatilityFactor> {
    let mut out = Vec::new();
    let key = vol_key();
    let Some(vol) = ctx.now(&key) else {
        return out;
    };

    if vol > HIGH_VOL {
        out.push(VolatilityFactor::HighVolatility(vol));
    } else if vol < LOW_VOL {
        out.push(VolatilityFactor::LowVolatility(vol));
    }

    if let Some(prev) = ctx.back(&key, VOL_WINDOW) {
        if vol < prev * CONTRACTION_RATIO {
            out.push(VolatilityFactor::Contracting);
        } else if vol > prev * EXPANSION_RATIO {
            out.push(VolatilityFactor::Expanding);
        }
    }
    out
}
