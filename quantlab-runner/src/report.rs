//! Comprehensive report: direction, risk, trading signal, and a
//! recommendation for the last bar of a series.

use std::fmt;

use serde::{Deserialize, Serialize};

use quantlab_core::domain::Bar;
use quantlab_core::risk::{estimate_price_targets, estimate_risk, PriceTargets, RiskConfig, RiskEstimate, MIN_TARGET_BARS};
use quantlab_core::signal::{score_composite, DirectionSignal, RiskTolerance, SignalConfig, TradingSignal};
use quantlab_core::{compute_indicators, QuantError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    AggressiveBuy,
    ModerateBuy,
    Wait,
    Reduce,
    Sell,
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecommendedAction::AggressiveBuy => "aggressive buy",
            RecommendedAction::ModerateBuy => "moderate buy",
            RecommendedAction::Wait => "wait",
            RecommendedAction::Reduce => "reduce",
            RecommendedAction::Sell => "sell",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    LowMedium,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "low",
            RiskLevel::LowMedium => "low-medium",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: RecommendedAction,
    pub risk_level: RiskLevel,
    /// Mean of the direction and signal scores.
    pub score: f64,
    pub summary: String,
}

impl Recommendation {
    pub fn from_signals(direction: &DirectionSignal, signal: &TradingSignal) -> Self {
        let score = (direction.score + signal.score) / 2.0;
        let (action, risk_level) = if score > 0.5 {
            (RecommendedAction::AggressiveBuy, RiskLevel::Medium)
        } else if score > 0.2 {
            (RecommendedAction::ModerateBuy, RiskLevel::LowMedium)
        } else if score < -0.5 {
            (RecommendedAction::Sell, RiskLevel::High)
        } else if score < -0.2 {
            (RecommendedAction::Reduce, RiskLevel::Medium)
        } else {
            (RecommendedAction::Wait, RiskLevel::Low)
        };
        Self {
            action,
            risk_level,
            score,
            summary: format!("{} - {}", signal.label, direction.label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveReport {
    pub symbol: String,
    pub current_price: f64,
    pub date: String,
    pub forward_days: usize,
    pub direction: DirectionSignal,
    pub risk: RiskEstimate,
    pub signal: TradingSignal,
    /// Present when the series is long enough for price targets.
    pub targets: Option<PriceTargets>,
    pub recommendation: Recommendation,
}

/// Full report with default signal and risk settings.
pub fn comprehensive_report(
    bars: &[Bar],
    forward_days: usize,
    tolerance: RiskTolerance,
) -> Result<ComprehensiveReport, QuantError> {
    comprehensive_report_with(
        bars,
        &SignalConfig::with_tolerance(tolerance),
        &RiskConfig::with_forward_days(forward_days),
    )
}

pub fn comprehensive_report_with(
    bars: &[Bar],
    signal_config: &SignalConfig,
    risk_config: &RiskConfig,
) -> Result<ComprehensiveReport, QuantError> {
    let indicators = compute_indicators(bars, &signal_config.indicators)?;
    let composite = score_composite(bars, &indicators, signal_config)?;
    let risk = estimate_risk(bars, risk_config)?;
    let targets = if bars.len() >= MIN_TARGET_BARS {
        Some(estimate_price_targets(bars, risk_config.forward_days)?)
    } else {
        None
    };

    let recommendation = Recommendation::from_signals(&composite.direction, &composite.signal);
    let last = bars.last().ok_or(QuantError::InsufficientData {
        feature: "comprehensive report",
        required: 1,
        actual: 0,
    })?;
    tracing::debug!(
        symbol = %last.symbol,
        action = %recommendation.action,
        score = recommendation.score,
        "Built comprehensive report."
    );

    Ok(ComprehensiveReport {
        symbol: last.symbol.clone(),
        current_price: last.close,
        date: last.date.to_string(),
        forward_days: risk_config.forward_days,
        direction: composite.direction,
        risk,
        signal: composite.signal,
        targets,
        recommendation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::{generate_synthetic, SyntheticSpec};
    use quantlab_core::ErrorKind;

    fn report_for(bars: usize) -> Result<ComprehensiveReport, QuantError> {
        let bars = generate_synthetic(&SyntheticSpec::new("RPT", bars, 21)).unwrap();
        comprehensive_report(&bars, 5, RiskTolerance::Moderate)
    }

    fn with_scores(direction_score: f64, signal_score: f64) -> Recommendation {
        let bars = generate_synthetic(&SyntheticSpec::new("RPT", 80, 2)).unwrap();
        let mut report = comprehensive_report(&bars, 5, RiskTolerance::Moderate).unwrap();
        report.direction.score = direction_score;
        report.signal.score = signal_score;
        Recommendation::from_signals(&report.direction, &report.signal)
    }

    #[test]
    fn recommendation_thresholds() {
        let cases = [
            (0.8, 0.4, RecommendedAction::AggressiveBuy, RiskLevel::Medium),
            (0.3, 0.3, RecommendedAction::ModerateBuy, RiskLevel::LowMedium),
            (0.2, 0.2, RecommendedAction::Wait, RiskLevel::Low),
            (-0.3, -0.3, RecommendedAction::Reduce, RiskLevel::Medium),
            (-0.5, -0.5, RecommendedAction::Reduce, RiskLevel::Medium),
            (-0.9, -0.4, RecommendedAction::Sell, RiskLevel::High),
        ];
        for (d, s, action, level) in cases {
            let rec = with_scores(d, s);
            assert_eq!(rec.action, action, "scores ({d}, {s})");
            assert_eq!(rec.risk_level, level, "scores ({d}, {s})");
        }
    }

    #[test]
    fn report_combines_all_parts() {
        let report = report_for(200).unwrap();
        assert_eq!(report.symbol, "RPT");
        assert_eq!(report.forward_days, 5);
        assert_eq!(report.current_price, report.risk.current_price);
        assert_eq!(report.signal.risk_tolerance, RiskTolerance::Moderate);
        assert!(report.targets.is_some());
        let expected = (report.direction.score + report.signal.score) / 2.0;
        assert!((report.recommendation.score - expected).abs() < 1e-12);
        assert!(report.recommendation.summary.contains(&report.direction.label.to_string()));
    }

    #[test]
    fn short_series_skips_targets() {
        let report = report_for(90).unwrap();
        assert!(report.targets.is_none());
    }

    #[test]
    fn fewer_than_sixty_bars_is_insufficient() {
        let err = report_for(45).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn serializes_to_json() {
        let report = report_for(130).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["recommendation"]["action"].is_string());
        assert!(json["risk"]["var_95"].is_number());
    }
}
