//! Scoring dimensions, factors, and the per-dimension component.
//!
//! A dimension analyser emits typed factors. The numeric score only reads
//! `Factor::delta`; the human-readable reasons come from `Display`, so the
//! numeric core can be tested without touching strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single rule hit inside one scoring dimension.
pub trait Factor: fmt::Display {
    /// Fixed contribution to the dimension score. Zero for descriptive factors.
    fn delta(&self) -> f64;
}

/// Sum of factor deltas, clamped to [-1, 1].
pub fn score_factors<F: Factor>(factors: &[F]) -> f64 {
    factors.iter().map(Factor::delta).sum::<f64>().clamp(-1.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Technical,
    Trend,
    Momentum,
    Volatility,
    Volume,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Technical,
        Dimension::Trend,
        Dimension::Momentum,
        Dimension::Volatility,
        Dimension::Volume,
    ];

    /// Composite weight. The five weights sum to 1.0.
    pub fn weight(self) -> f64 {
        match self {
            Dimension::Technical => 0.30,
            Dimension::Trend => 0.25,
            Dimension::Momentum => 0.20,
            Dimension::Volatility => 0.15,
            Dimension::Volume => 0.10,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dimension::Technical => "technical",
            Dimension::Trend => "trend",
            Dimension::Momentum => "momentum",
            Dimension::Volatility => "volatility",
            Dimension::Volume => "volume",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Score of one dimension, in [-1, 1], with the reasons behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalComponent {
    pub name: Dimension,
    pub score: f64,
    pub reasons: Vec<String>,
}

impl SignalComponent {
    pub fn from_factors<F: Factor>(name: Dimension, factors: &[F]) -> Self {
        Self {
            name,
            score: score_factors(factors),
            reasons: factors.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn weighted(&self) -> f64 {
        self.name.weight() * self.score
    }
}

/// Weighted sum of component scores.
pub fn composite_score(components: &[SignalComponent]) -> f64 {
    components.iter().map(SignalComponent::weighted).sum()
}
