//! Volume dimension: volume ratio against the 20-bar mean, read together with
//! the last one-bar price move.

use super::component::Factor;
use super::context::{volume_ratio_key, ScoringContext};
use std::fmt;

const MOVE_THRESHOLD: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeFactor {
    SurgeUp(f64),
    SurgeDown(f64),
    ThinUp(f64),
    ThinDown(f64),
    Expanding(f64),
    Shrinking(f64),
    Normal(f64),
}

impl Factor for VolumeFactor {
    fn delta(&self) -> f64 {
        match self {
            VolumeFactor::SurgeUp(_) => 0.4,
            VolumeFactor::SurgeDown(_) => -0.4,
            VolumeFactor::ThinUp(_) => 0.1,
            VolumeFactor::ThinDown(_) => -0.1,
            VolumeFactor::Expanding(_) | VolumeFactor::Shrinking(_) | VolumeFactor::Normal(_) => 0.0,
        }
    }
}

impl fmt::Display for VolumeFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeFactor::SurgeUp(r) => write!(f, "price up on heavy volume (ratio {r:.1})"),
            VolumeFactor::SurgeDown(r) => write!(f, "price down on heavy volume (ratio {r:.1})"),
            VolumeFactor::ThinUp(r) => write!(f, "price up on light volume (ratio {r:.1})"),
            VolumeFactor::ThinDown(r) => write!(f, "price down on light volume (ratio {r:.1})"),
            VolumeFactor::Expanding(r) => write!(f, "volume expanding (ratio {r:.1})"),
            VolumeFactor::Shrinking(r) => write!(f, "volume shrinking (ratio {r:.1})"),
            VolumeFactor::Normal(r) => write!(f, "volume normal (ratio {r:.1})"),
        }
    }
}

pub fn factors(ctx: &ScoringContext<'_>) -> Vec<VolumeFactor> {
    let (Some(ratio), Some(prev_close)) = (ctx.now(&volume_ratio_key()), ctx.prev_close()) else {
        return Vec::new();
    };
    let change = ctx.close() / prev_close - 1.0;

    let factor = if ratio > 2.0 && change > MOVE_THRESHOLD {
        VolumeFactor::SurgeUp(ratio)
    } else if ratio > 2.0 && change < -MOVE_THRESHOLD {
        VolumeFactor::SurgeDown(ratio)
    } else if ratio < 0.5 && change > MOVE_THRESHOLD {
        VolumeFactor::ThinUp(ratio)
    } else if ratio < 0.5 && change < -MOVE_THRESHOLD {
        VolumeFactor::ThinDown(ratio)
    } else if ratio > 1.5 {
        VolumeFactor::Expanding(ratio)
    } else if ratio < 0.7 {
        VolumeFactor::Shrinking(ratio)
    } else {
        VolumeFactor::Normal(ratio)
    };
    vec![factor]
}
