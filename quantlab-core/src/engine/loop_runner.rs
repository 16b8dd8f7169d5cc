//! Bar-by-bar simulation loop.
//!
//! Per bar:
//! 1. Ask the strategy for an action
//! 2. Enter while flat (sized from cash, costs included)
//! 3. Exit while long (append a trade)
//! 4. Liquidate on the last bar if the run asks for it
//! 5. Mark to market and record an equity point

use super::accounting::Account;
use super::state::{SimulationResult, SimulatorConfig};
use crate::components::indicator::IndicatorValues;
use crate::components::strategy::{Action, Strategy};
use crate::domain::{validate_bars, Bar};
use crate::error::{QuantError, Result};

/// Validate inputs, compute the strategy's indicators, and simulate.
pub fn run_simulation(
    bars: &[Bar],
    strategy: &Strategy,
    config: &SimulatorConfig,
) -> Result<SimulationResult> {
    validate_bars(bars)?;
    let indicators = strategy.compute_indicators(bars);
    run_simulation_with(bars, strategy, &indicators, config)
}

/// Simulate with precomputed indicators (e.g. served from a cache).
///
/// Every indicator the strategy requires must be present.
pub fn run_simulation_with(
    bars: &[Bar],
    strategy: &Strategy,
    indicators: &IndicatorValues,
    config: &SimulatorConfig,
) -> Result<SimulationResult> {
    validate_bars(bars)?;
    config.validate()?;
    if let Some(missing) = strategy
        .required_indicators()
        .iter()
        .find(|i| !indicators.contains(i.name()))
    {
        return Err(QuantError::invalid(format!(
            "indicator '{}' required by strategy '{}' was not supplied",
            missing.name(),
            strategy.id()
        )));
    }

    let n = bars.len();
    let mut account = Account::new(config);
    let mut equity_curve = Vec::with_capacity(n);
    let mut trades = Vec::new();
    let mut actions = Vec::with_capacity(n);
    let mut skipped_entries = 0;

    for (t, bar) in bars.iter().enumerate() {
        let action = strategy.evaluate(bars, indicators, t);
        actions.push(action);

        match action {
            Action::Enter if account.state().is_flat() => {
                if !account.enter(bar, t) {
                    skipped_entries += 1;
                }
            }
            Action::Exit => {
                if let Some(trade) = account.exit(bar, t) {
                    trades.push(trade);
                }
            }
            _ => {}
        }

        if t == n - 1 && config.liquidate_at_end {
            if let Some(trade) = account.exit(bar, t) {
                trades.push(trade);
            }
        }

        equity_curve.push(account.mark(bar));
    }

    Ok(SimulationResult {
        initial_capital: config.initial_capital,
        equity_curve,
        trades,
        actions,
        open_position: account.state().position().cloned(),
        final_cash: account.cash(),
        skipped_entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};
    use std::collections::HashMap;

    fn ma_cross(fast: f64, slow: f64) -> Strategy {
        let raw: HashMap<String, f64> = [("fast".to_string(), fast), ("slow".to_string(), slow)]
            .into_iter()
            .collect();
        Strategy::from_params("ma_cross", &raw).unwrap()
    }

    /// Up for 30 bars, down for 30, up for 30.
    fn zigzag() -> Vec<f64> {
        let mut closes = Vec::new();
        for i in 0..30 {
            closes.push(100.0 + i as f64);
        }
        for i in 0..30 {
            closes.push(129.0 - i as f64);
        }
        for i in 0..30 {
            closes.push(100.0 + i as f64);
        }
        closes
    }

    #[test]
    fn one_equity_point_per_bar() {
        let bars = make_bars(&zigzag());
        let result = run_simulation(&bars, &ma_cross(3.0, 8.0), &SimulatorConfig::default()).unwrap();
        assert_eq!(result.equity_curve.len(), bars.len());
        assert_eq!(result.actions.len(), bars.len());
    }

    #[test]
    fn conservation_holds() {
        let bars = make_bars(&zigzag());
        let result = run_simulation(&bars, &ma_cross(3.0, 8.0), &SimulatorConfig::default()).unwrap();
        for p in &result.equity_curve {
            assert_approx(p.equity, p.cash + p.position_value, 1e-9);
        }
        let last = result.equity_curve.last().unwrap();
        let open_value = result
            .open_position
            .as_ref()
            .map(|p| p.market_value(last.close))
            .unwrap_or(0.0);
        assert_approx(result.final_cash + open_value, last.equity, 1e-9);
    }

    #[test]
    fn zigzag_produces_round_trip() {
        let bars = make_bars(&zigzag());
        let result = run_simulation(&bars, &ma_cross(3.0, 8.0), &SimulatorConfig::default()).unwrap();
        assert!(!result.trades.is_empty());
        // Trades never overlap and alternate with entries.
        for pair in result.trades.windows(2) {
            assert!(pair[0].exit_bar <= pair[1].entry_bar);
        }
    }

    #[test]
    fn open_position_not_in_ledger_without_liquidation() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let result = run_simulation(&bars, &ma_cross(3.0, 8.0), &SimulatorConfig::default()).unwrap();
        assert!(result.trades.is_empty());
        assert!(result.open_position.is_some());
        assert!(result.equity_curve.last().unwrap().position_value > 0.0);
    }

    #[test]
    fn liquidation_closes_final_position() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let cfg = SimulatorConfig::default().with_liquidation(true);
        let result = run_simulation(&bars, &ma_cross(3.0, 8.0), &cfg).unwrap();
        assert_eq!(result.trades.len(), 1);
        assert!(result.open_position.is_none());
        let last = result.equity_curve.last().unwrap();
        assert_eq!(last.position_value, 0.0);
        assert_approx(last.cash, result.final_cash, 1e-12);
        assert_eq!(result.trades[0].exit_bar, 49);
    }

    #[test]
    fn insufficient_capital_counts_skips() {
        let closes: Vec<f64> = (0..50).map(|i| 1_000.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let cfg = SimulatorConfig::frictionless(500.0);
        let result = run_simulation(&bars, &ma_cross(3.0, 8.0), &cfg).unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.skipped_entries, 1);
        assert!(result.equity_curve.iter().all(|p| p.equity == 500.0));
    }

    #[test]
    fn missing_indicator_rejected() {
        let bars = make_bars(&zigzag());
        let err = run_simulation_with(
            &bars,
            &ma_cross(3.0, 8.0),
            &IndicatorValues::new(),
            &SimulatorConfig::default(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn invalid_bars_rejected_before_simulation() {
        let mut bars = make_bars(&zigzag());
        bars[10].date = bars[9].date;
        assert!(run_simulation(&bars, &ma_cross(3.0, 8.0), &SimulatorConfig::default()).is_err());
    }
}
