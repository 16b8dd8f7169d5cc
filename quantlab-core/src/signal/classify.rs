//! Direction and trading-signal classification of a composite score.
//!
//! The two classifiers deliberately use different tables: direction is a
//! single symmetric threshold, the trading signal is tiered per risk
//! tolerance and carries ATR-based stop and target prices.

use super::component::SignalComponent;
use crate::error::{QuantError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_DIRECTION_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Bearish,
    Neutral,
    Bullish,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Bearish => "bearish",
            Direction::Neutral => "neutral",
            Direction::Bullish => "bullish",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionSignal {
    pub label: Direction,
    pub confidence: f64,
    pub score: f64,
    pub components: Vec<SignalComponent>,
}

/// Classify a composite score into a direction.
///
/// Confidence grows with |score| and with how many non-zero components
/// agree in sign with the score.
pub fn classify_direction(score: f64, components: &[SignalComponent], threshold: f64) -> DirectionSignal {
    let label = if score >= threshold {
        Direction::Bullish
    } else if score <= -threshold {
        Direction::Bearish
    } else {
        Direction::Neutral
    };

    let voting: Vec<f64> = components.iter().map(|c| c.score).filter(|s| *s != 0.0).collect();
    let agreement = if voting.is_empty() || score == 0.0 {
        0.0
    } else {
        let agree = voting.iter().filter(|s| s.signum() == score.signum()).count();
        agree as f64 / voting.len() as f64
    };

    DirectionSignal {
        label,
        confidence: (score.abs() + 0.2 * agreement).min(1.0),
        score,
        components: components.to_vec(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    pub const ALL: [RiskTolerance; 3] = [
        RiskTolerance::Conservative,
        RiskTolerance::Moderate,
        RiskTolerance::Aggressive,
    ];

    pub fn params(self) -> RiskParams {
        match self {
            RiskTolerance::Conservative => RiskParams {
                signal_threshold: 0.6,
                stop_loss_atr: 1.5,
                take_profit_atr: 2.0,
                min_confidence: 0.6,
            },
            RiskTolerance::Moderate => RiskParams {
                signal_threshold: 0.4,
                stop_loss_atr: 2.0,
                take_profit_atr: 3.0,
                min_confidence: 0.4,
            },
            RiskTolerance::Aggressive => RiskParams {
                signal_threshold: 0.2,
                stop_loss_atr: 2.5,
                take_profit_atr: 4.0,
                min_confidence: 0.2,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RiskTolerance::Conservative => "conservative",
            RiskTolerance::Moderate => "moderate",
            RiskTolerance::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RiskTolerance {
    type Err = QuantError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(RiskTolerance::Conservative),
            "moderate" => Ok(RiskTolerance::Moderate),
            "aggressive" => Ok(RiskTolerance::Aggressive),
            other => Err(QuantError::invalid(format!("unknown risk tolerance '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskParams {
    pub signal_threshold: f64,
    pub stop_loss_atr: f64,
    pub take_profit_atr: f64,
    pub min_confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalLabel {
    StrongSell,
    Sell,
    Hold,
    Buy,
    StrongBuy,
}

impl SignalLabel {
    pub fn is_buy(self) -> bool {
        matches!(self, SignalLabel::Buy | SignalLabel::StrongBuy)
    }

    pub fn is_sell(self) -> bool {
        matches!(self, SignalLabel::Sell | SignalLabel::StrongSell)
    }
}

impl fmt::Display for SignalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignalLabel::StrongSell => "strong sell",
            SignalLabel::Sell => "sell",
            SignalLabel::Hold => "hold",
            SignalLabel::Buy => "buy",
            SignalLabel::StrongBuy => "strong buy",
        })
    }
}

/// Tiered label for `score` under `threshold`.
pub fn label_for(score: f64, threshold: f64) -> SignalLabel {
    if score >= 2.0 * threshold {
        SignalLabel::StrongBuy
    } else if score >= threshold {
        SignalLabel::Buy
    } else if score <= -2.0 * threshold {
        SignalLabel::StrongSell
    } else if score <= -threshold {
        SignalLabel::Sell
    } else {
        SignalLabel::Hold
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub label: SignalLabel,
    pub confidence: f64,
    pub score: f64,
    pub entry: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub risk_reward_ratio: Option<f64>,
    pub atr: f64,
    pub risk_tolerance: RiskTolerance,
    pub reasons: Vec<String>,
    pub components: Vec<SignalComponent>,
    /// True when a non-hold label was downgraded by the confidence gate.
    pub gated: bool,
}

/// Classify a composite score into a trading signal with stop and target.
pub fn classify_signal(
    score: f64,
    components: &[SignalComponent],
    close: f64,
    atr: f64,
    tolerance: RiskTolerance,
    max_reasons: usize,
) -> TradingSignal {
    let rp = tolerance.params();
    let confidence = (score.abs() / rp.signal_threshold).min(1.0);

    let mut label = label_for(score, rp.signal_threshold);
    let mut gated = false;
    if label != SignalLabel::Hold && confidence < rp.min_confidence {
        label = SignalLabel::Hold;
        gated = true;
    }

    let (stop_loss, take_profit) = if label.is_buy() {
        (Some(close - rp.stop_loss_atr * atr), Some(close + rp.take_profit_atr * atr))
    } else if label.is_sell() {
        (Some(close + rp.stop_loss_atr * atr), Some(close - rp.take_profit_atr * atr))
    } else {
        (None, None)
    };
    let risk_reward_ratio = stop_loss.map(|_| rp.take_profit_atr / rp.stop_loss_atr);

    let reasons = components
        .iter()
        .flat_map(|c| c.reasons.iter().cloned())
        .take(max_reasons)
        .collect();

    TradingSignal {
        label,
        confidence,
        score,
        entry: close,
        stop_loss,
        take_profit,
        risk_reward_ratio,
        atr,
        risk_tolerance: tolerance,
        reasons,
        components: components.to_vec(),
        gated,
    }
}
