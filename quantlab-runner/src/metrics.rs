//! Performance metrics: pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: equity curve and/or trade list in, value
//! out. Ratios with a zero or empty denominator are undefined and return
//! `None`; they serialize as JSON `null`.

use quantlab_core::domain::TradeRecord;
use quantlab_core::engine::SimulationResult;
use quantlab_core::stats;
use serde::{Deserialize, Serialize};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    /// Positive fraction, e.g. 0.15 = 15% peak-to-trough decline.
    pub max_drawdown: f64,
    pub sharpe: Option<f64>,
    pub sortino: Option<f64>,
    pub calmar: Option<f64>,
    pub win_rate: Option<f64>,
    pub profit_factor: Option<f64>,
    pub avg_win: Option<f64>,
    pub avg_loss: Option<f64>,
    pub avg_trade_pnl: Option<f64>,
    pub avg_holding_days: Option<f64>,
    pub trade_count: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub final_equity: f64,
    pub trading_days: usize,
}

impl PerformanceMetrics {
    /// Compute all metrics from a simulation result.
    ///
    /// `risk_free_rate` is annual; it is spread evenly over 252 days.
    pub fn compute(result: &SimulationResult, risk_free_rate: f64) -> Self {
        let equity = result.equity_values();
        let trades = &result.trades;
        let trading_days = equity.len();
        let final_equity = result.final_equity();

        let total = total_return(result.initial_capital, final_equity);
        let annualized = annualized_return(total, trading_days);
        let dd = stats::max_drawdown(&equity);

        Self {
            total_return: total,
            annualized_return: annualized,
            annualized_volatility: annualized_volatility(&equity),
            max_drawdown: dd,
            sharpe: sharpe_ratio(&equity, risk_free_rate),
            sortino: sortino_ratio(&equity, risk_free_rate),
            calmar: calmar_ratio(annualized, dd),
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            avg_win: mean_of(trades.iter().filter(|t| t.is_winner()).map(|t| t.pnl)),
            avg_loss: mean_of(trades.iter().filter(|t| t.is_loser()).map(|t| t.pnl)),
            avg_trade_pnl: mean_of(trades.iter().map(|t| t.pnl)),
            avg_holding_days: mean_of(trades.iter().map(|t| t.holding_days as f64)),
            trade_count: trades.len(),
            winning_trades: trades.iter().filter(|t| t.is_winner()).count(),
            losing_trades: trades.iter().filter(|t| t.is_loser()).count(),
            max_consecutive_wins: max_consecutive(trades, true),
            max_consecutive_losses: max_consecutive(trades, false),
            final_equity,
            trading_days,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(initial: f64, final_equity: f64) -> f64 {
    if initial <= 0.0 {
        return 0.0;
    }
    (final_equity - initial) / initial
}

/// Geometric annualization of `total` over `trading_days` bars.
///
/// A total loss of 100% or more annualizes to -100%.
pub fn annualized_return(total: f64, trading_days: usize) -> f64 {
    if trading_days == 0 {
        return 0.0;
    }
    let growth = 1.0 + total;
    if growth <= 0.0 {
        return -1.0;
    }
    growth.powf(TRADING_DAYS_PER_YEAR / trading_days as f64) - 1.0
}

/// Sample standard deviation of daily returns, annualized.
pub fn annualized_volatility(equity_curve: &[f64]) -> f64 {
    stats::sample_std(&daily_returns(equity_curve)) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Annualized Sharpe ratio from daily returns.
///
/// Sharpe = mean(daily returns - rf) / std(daily returns) * sqrt(252).
/// Undefined when the return standard deviation is zero.
pub fn sharpe_ratio(equity_curve: &[f64], risk_free_rate: f64) -> Option<f64> {
    let excess = excess_returns(equity_curve, risk_free_rate);
    if excess.len() < 2 {
        return None;
    }
    let std = stats::sample_std(&excess);
    if std < 1e-15 {
        return None;
    }
    Some(stats::mean(&excess) / std * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Annualized Sortino ratio (downside deviation only).
///
/// Downside deviation is the root of the summed squared negative excess
/// returns over the full return count. Undefined without downside.
pub fn sortino_ratio(equity_curve: &[f64], risk_free_rate: f64) -> Option<f64> {
    let excess = excess_returns(equity_curve, risk_free_rate);
    if excess.len() < 2 {
        return None;
    }
    let downside_sq: f64 = excess.iter().filter(|r| **r < 0.0).map(|r| r * r).sum();
    let downside_std = (downside_sq / excess.len() as f64).sqrt();
    if downside_std < 1e-15 {
        return None;
    }
    Some(stats::mean(&excess) / downside_std * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Calmar ratio: annualized return / max drawdown. Undefined without drawdown.
pub fn calmar_ratio(annualized: f64, max_drawdown: f64) -> Option<f64> {
    if max_drawdown <= 0.0 {
        return None;
    }
    Some(annualized / max_drawdown)
}

/// Fraction of trades with positive net pnl.
pub fn win_rate(trades: &[TradeRecord]) -> Option<f64> {
    if trades.is_empty() {
        return None;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    Some(winners as f64 / trades.len() as f64)
}

/// Gross profits / gross losses. Undefined without a losing trade.
pub fn profit_factor(trades: &[TradeRecord]) -> Option<f64> {
    let gross_loss: f64 = trades.iter().filter(|t| t.is_loser()).map(|t| t.pnl.abs()).sum();
    if gross_loss <= 0.0 {
        return None;
    }
    let gross_profit: f64 = trades.iter().filter(|t| t.is_winner()).map(|t| t.pnl).sum();
    Some(gross_profit / gross_loss)
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Compute daily returns from an equity curve.
pub fn daily_returns(equity_curve: &[f64]) -> Vec<f64> {
    stats::simple_returns(equity_curve)
}

fn excess_returns(equity_curve: &[f64], risk_free_rate: f64) -> Vec<f64> {
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    daily_returns(equity_curve).iter().map(|r| r - daily_rf).collect()
}

fn mean_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        None
    } else {
        Some(stats::mean(&values))
    }
}

/// Longest run of consecutive winners (or losers). Breakeven trades end both.
pub fn max_consecutive(trades: &[TradeRecord], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for trade in trades {
        let counts = if winners { trade.is_winner() } else { trade.is_loser() };
        if counts {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}
