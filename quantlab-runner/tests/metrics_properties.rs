//! Property tests for the metrics calculator over arbitrary runs.

use proptest::prelude::*;
use quantlab_runner::data_loader::{generate_synthetic, SyntheticSpec};
use quantlab_runner::metrics::{annualized_return, max_consecutive, total_return};
use quantlab_runner::runner::{run_backtest, BacktestRequest};

const STRATEGIES: [&str; 7] = ["ma_cross", "double_ma", "macd", "macd_hist", "rsi", "kdj", "bollinger"];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn metrics_are_internally_consistent(
        seed in 0u64..10_000,
        n in 120usize..400,
        which in 0usize..STRATEGIES.len(),
    ) {
        let bars = generate_synthetic(&SyntheticSpec::new("PROP", n, seed)).unwrap();
        let result = run_backtest(&bars, &BacktestRequest::new(STRATEGIES[which])).unwrap();
        let m = &result.metrics;

        prop_assert_eq!(m.trade_count, result.trades.len());
        prop_assert!(m.winning_trades + m.losing_trades <= m.trade_count);
        prop_assert!(m.max_consecutive_wins <= m.winning_trades);
        prop_assert!(m.max_consecutive_losses <= m.losing_trades);
        prop_assert!((0.0..=1.0).contains(&m.max_drawdown));
        prop_assert!(m.annualized_volatility >= 0.0);

        match m.win_rate {
            Some(w) => prop_assert!((0.0..=1.0).contains(&w)),
            None => prop_assert_eq!(m.trade_count, 0),
        }
        if m.losing_trades == 0 {
            prop_assert!(m.profit_factor.is_none());
        }
        if let Some(pf) = m.profit_factor {
            prop_assert!(pf >= 0.0);
        }
        if m.max_drawdown == 0.0 {
            prop_assert!(m.calmar.is_none());
        }
        for value in [m.sharpe, m.sortino, m.calmar, m.avg_win, m.avg_loss] {
            if let Some(v) = value {
                prop_assert!(v.is_finite());
            }
        }
        let expected_total = (m.final_equity - result.initial_capital) / result.initial_capital;
        prop_assert!((m.total_return - expected_total).abs() < 1e-12);
    }

    #[test]
    fn annualized_has_the_sign_of_total(total in -0.99f64..5.0, days in 1usize..3000) {
        let ann = annualized_return(total, days);
        prop_assert!(ann >= -1.0);
        if total >= 0.0 {
            prop_assert!(ann >= 0.0);
        } else {
            prop_assert!(ann <= 0.0);
        }
    }

    #[test]
    fn total_return_round_trips(initial in 1.0f64..1e7, growth in 0.0f64..3.0) {
        let final_equity = initial * growth;
        prop_assert!((total_return(initial, final_equity) - (growth - 1.0)).abs() < 1e-9);
    }
}

#[test]
fn no_trades_means_empty_streaks() {
    assert_eq!(max_consecutive(&[], true), 0);
    assert_eq!(max_consecutive(&[], false), 0);
}
