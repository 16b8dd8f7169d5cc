//! Scenario tests for the backtest simulator driven by real strategies.

use chrono::NaiveDate;
use quantlab_core::domain::Bar;
use quantlab_core::engine::{run_simulation, SimulatorConfig};
use quantlab_core::{Action, Strategy};
use std::collections::HashMap;

fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let open = if i == 0 { c } else { closes[i - 1] };
            Bar {
                symbol: "SCN".into(),
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(c) + 0.5,
                low: open.min(c) - 0.5,
                close: c,
                volume: 10_000.0,
            }
        })
        .collect()
}

fn ma_cross(fast: f64, slow: f64) -> Strategy {
    let params = HashMap::from([("fast".to_string(), fast), ("slow".to_string(), slow)]);
    Strategy::from_params("ma_cross", &params).unwrap()
}

#[test]
fn rising_series_enters_once_and_never_exits() {
    let closes: Vec<f64> = (0..200).map(|i| 50.0 + i as f64 * 0.25).collect();
    let bars = bars_from_closes(&closes);
    let cfg = SimulatorConfig::default();
    let result = run_simulation(&bars, &ma_cross(5.0, 20.0), &cfg).unwrap();

    let enters = result.actions.iter().filter(|a| **a == Action::Enter).count();
    let exits = result.actions.iter().filter(|a| **a == Action::Exit).count();
    assert_eq!(enters, 1);
    assert_eq!(exits, 0);
    assert!(result.trades.is_empty());
    assert!(result.open_position.is_some());

    let round_trip = cfg.initial_capital * 2.0 * cfg.cost_rate();
    assert!(result.final_equity() > cfg.initial_capital - round_trip);
}

#[test]
fn rising_series_with_liquidation_books_one_winner() {
    let closes: Vec<f64> = (0..200).map(|i| 50.0 + i as f64 * 0.25).collect();
    let bars = bars_from_closes(&closes);
    let cfg = SimulatorConfig::default().with_liquidation(true);
    let result = run_simulation(&bars, &ma_cross(5.0, 20.0), &cfg).unwrap();

    assert_eq!(result.trades.len(), 1);
    assert!(result.open_position.is_none());
    let trade = &result.trades[0];
    assert!(trade.is_winner());
    assert_eq!(trade.exit_bar, 199);
    assert!(trade.costs > 0.0);
    assert!((trade.gross_pnl - trade.costs - trade.pnl).abs() < 1e-6);
}

#[test]
fn oscillating_series_completes_cycles() {
    // Two full sine cycles produce alternating golden and death crosses.
    let closes: Vec<f64> = (0..240)
        .map(|i| 100.0 + (i as f64 * std::f64::consts::PI / 40.0).sin() * 15.0)
        .collect();
    let bars = bars_from_closes(&closes);
    let result = run_simulation(&bars, &ma_cross(5.0, 20.0), &SimulatorConfig::default()).unwrap();

    assert!(!result.trades.is_empty());
    let enters = result.actions.iter().filter(|a| **a == Action::Enter).count();
    let completed = result.trades.len();
    let open = usize::from(result.open_position.is_some());
    assert!(completed + open <= enters);

    for pair in result.trades.windows(2) {
        assert!(pair[0].exit_bar <= pair[1].entry_bar, "positions overlap");
    }
    for point in &result.equity_curve {
        assert!((point.cash + point.position_value - point.equity).abs() < 1e-6);
    }
}

#[test]
fn every_strategy_runs_on_the_same_series() {
    let closes: Vec<f64> = (0..300)
        .map(|i| 80.0 + (i as f64 * 0.11).sin() * 8.0 + (i as f64 * 0.037).cos() * 5.0)
        .collect();
    let bars = bars_from_closes(&closes);
    for info in quantlab_core::strategy_catalog() {
        let strategy = Strategy::with_defaults(info.id).unwrap();
        let result = run_simulation(&bars, &strategy, &SimulatorConfig::default()).unwrap();
        assert_eq!(result.equity_curve.len(), bars.len(), "{}", info.id);
        assert_eq!(result.actions.len(), bars.len(), "{}", info.id);
    }
}

#[test]
fn frictionless_round_trip_is_exact() {
    // Flat, then a jump that triggers a golden cross, then a collapse.
    let mut closes = vec![100.0; 30];
    closes.extend(vec![110.0; 30]);
    closes.extend(vec![90.0; 30]);
    let bars = bars_from_closes(&closes);
    let cfg = SimulatorConfig::frictionless(10_000.0);
    let result = run_simulation(&bars, &ma_cross(5.0, 20.0), &cfg).unwrap();

    for trade in &result.trades {
        assert_eq!(trade.costs, 0.0);
        let expected = (trade.exit_price - trade.entry_price) * trade.shares as f64;
        assert!((trade.pnl - expected).abs() < 1e-9);
    }
}

#[test]
fn invalid_config_is_rejected() {
    let bars = bars_from_closes(&[10.0; 50]);
    let cfg = SimulatorConfig {
        lot_size: 0,
        ..SimulatorConfig::default()
    };
    assert!(run_simulation(&bars, &ma_cross(5.0, 20.0), &cfg).is_err());
}
