//! Composite signal engine.
//!
//! Five dimensions (technical, trend, momentum, volatility, volume) are each
//! scored from typed factors at the last bar, weighted into one composite
//! score, and classified twice: into a market direction and into a
//! risk-tolerance-dependent trading signal. Stateless: the same bars and
//! indicators always give the same report.

pub mod classify;
pub mod component;
pub mod context;
pub mod momentum;
pub mod technical;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use classify::{
    classify_direction, classify_signal, label_for, Direction, DirectionSignal, RiskParams,
    RiskTolerance, SignalLabel, TradingSignal, DEFAULT_DIRECTION_THRESHOLD,
};
pub use component::{composite_score, Dimension, Factor, SignalComponent};
pub use context::ScoringContext;

use crate::components::indicator::IndicatorValues;
use crate::domain::{validate_bars, Bar};
use crate::error::{require_bars, QuantError, Result};
use crate::indicators::IndicatorParams;
use serde::{Deserialize, Serialize};

/// Minimum history for direction and trading signals.
pub const MIN_SIGNAL_BARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub tolerance: RiskTolerance,
    pub direction_threshold: f64,
    pub indicators: IndicatorParams,
    pub max_reasons: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            tolerance: RiskTolerance::default(),
            direction_threshold: DEFAULT_DIRECTION_THRESHOLD,
            indicators: IndicatorParams::default(),
            max_reasons: 5,
        }
    }
}

impl SignalConfig {
    pub fn with_tolerance(tolerance: RiskTolerance) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.direction_threshold.is_finite()
            || self.direction_threshold <= 0.0
            || self.direction_threshold > 1.0
        {
            return Err(QuantError::invalid(format!(
                "direction_threshold must be in (0, 1], got {}",
                self.direction_threshold
            )));
        }
        self.indicators.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeReport {
    pub direction: DirectionSignal,
    pub signal: TradingSignal,
}

/// Score every dimension at the last bar.
pub fn score_components(ctx: &ScoringContext<'_>) -> Vec<SignalComponent> {
    vec![
        SignalComponent::from_factors(Dimension::Technical, &technical::factors(ctx)),
        SignalComponent::from_factors(Dimension::Trend, &trend::factors(ctx)),
        SignalComponent::from_factors(Dimension::Momentum, &momentum::factors(ctx)),
        SignalComponent::from_factors(Dimension::Volatility, &volatility::factors(ctx)),
        SignalComponent::from_factors(Dimension::Volume, &volume::factors(ctx)),
    ]
}

/// Composite direction and trading signal for the last bar of `bars`.
///
/// `indicators` may be empty or partial; anything missing is computed from
/// the bars. Both outputs share one composite score.
pub fn score_composite(bars: &[Bar], indicators: &IndicatorValues, config: &SignalConfig) -> Result<CompositeReport> {
    config.validate()?;
    validate_bars(bars)?;
    require_bars("composite signal", MIN_SIGNAL_BARS, bars.len())?;

    let ctx = ScoringContext::new(bars, indicators, &config.indicators)?;
    let components = score_components(&ctx);
    let score = composite_score(&components);

    let atr = ctx
        .now(&config.indicators.atr_key())
        .ok_or(QuantError::InsufficientData {
            feature: "composite signal ATR",
            required: config.indicators.atr_period,
            actual: bars.len(),
        })?;

    let direction = classify_direction(score, &components, config.direction_threshold);
    let signal = classify_signal(
        score,
        &components,
        ctx.close(),
        atr,
        config.tolerance,
        config.max_reasons,
    );
    Ok(CompositeReport { direction, signal })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::indicators::{assert_approx, compute_indicators, make_bars};
    use chrono::NaiveDate;

    fn flat_bars(n: usize, price: f64) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        (0..n)
            .map(|i| Bar {
                symbol: "FLAT".into(),
                date: start + chrono::Duration::days(i as i64),
                open: price,
                high: price,
                low: price,
                close: price,
                volume: 1000.0,
            })
            .collect()
    }

    fn component(report: &CompositeReport, dim: Dimension) -> &SignalComponent {
        report
            .signal
            .components
            .iter()
            .find(|c| c.name == dim)
            .unwrap()
    }

    #[test]
    fn flat_series_scores_neutral() {
        let bars = flat_bars(100, 10.0);
        let report = score_composite(&bars, &IndicatorValues::new(), &SignalConfig::default()).unwrap();

        assert_eq!(component(&report, Dimension::Technical).score, 0.0);
        assert_eq!(component(&report, Dimension::Trend).score, 0.0);
        assert_eq!(component(&report, Dimension::Momentum).score, 0.0);
        assert_eq!(component(&report, Dimension::Volume).score, 0.0);
        // Zero realized volatility reads as a calm market.
        assert_approx(component(&report, Dimension::Volatility).score, 0.1, 1e-12);

        assert_approx(report.signal.score, 0.015, 1e-12);
        assert_eq!(report.direction.score, report.signal.score);
        assert_eq!(report.direction.label, Direction::Neutral);
        assert_eq!(report.signal.label, SignalLabel::Hold);
        assert_eq!(report.signal.atr, 0.0);
        assert!(report.signal.stop_loss.is_none());
    }

    #[test]
    fn supplied_indicators_match_computed() {
        let closes: Vec<f64> = (0..120).map(|i| 50.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1).collect();
        let bars = make_bars(&closes);
        let cfg = SignalConfig::default();
        let supplied = compute_indicators(&bars, &cfg.indicators).unwrap();

        let a = score_composite(&bars, &supplied, &cfg).unwrap();
        let b = score_composite(&bars, &IndicatorValues::new(), &cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn strong_uptrend_is_bullish() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let bars = make_bars(&closes);
        let report = score_composite(&bars, &IndicatorValues::new(), &SignalConfig::default()).unwrap();

        assert!(component(&report, Dimension::Trend).score > 0.5);
        assert!(component(&report, Dimension::Momentum).score > 0.0);
        assert!(report.signal.score > 0.0);
        assert!(report.signal.reasons.len() <= 5);
    }

    #[test]
    fn short_history_is_insufficient() {
        let bars = flat_bars(59, 10.0);
        let err = score_composite(&bars, &IndicatorValues::new(), &SignalConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn mismatched_indicator_length_is_rejected() {
        let bars = flat_bars(80, 10.0);
        let mut supplied = IndicatorValues::new();
        supplied.insert("rsi_14", vec![Some(50.0); 10]);
        let err = score_composite(&bars, &supplied, &SignalConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn bad_threshold_is_rejected() {
        let cfg = SignalConfig {
            direction_threshold: 0.0,
            ..SignalConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
