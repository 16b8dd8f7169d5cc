//! Backtest runner: wires together strategy, simulator, and metrics.
//!
//! `run_backtest()` takes pre-loaded bars and a `BacktestRequest`; all
//! validation errors from the core surface unchanged inside `RunError`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quantlab_core::domain::{Bar, EquityPoint, Position, TradeRecord};
use quantlab_core::engine::{run_simulation_with, SimulatorConfig};
use quantlab_core::{QuantError, Strategy};

use crate::data_loader::dataset_hash;
use crate::metrics::PerformanceMetrics;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Core(#[from] QuantError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Everything needed to run one backtest over already-loaded bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub strategy: String,
    #[serde(default)]
    pub params: HashMap<String, f64>,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    /// Annual risk-free rate for Sharpe and Sortino.
    #[serde(default)]
    pub risk_free_rate: f64,
}

impl BacktestRequest {
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            params: HashMap::new(),
            simulator: SimulatorConfig::default(),
            risk_free_rate: 0.0,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn with_simulator(mut self, simulator: SimulatorConfig) -> Self {
        self.simulator = simulator;
        self
    }
}

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub strategy: String,
    /// Resolved parameters, defaults included.
    pub params: BTreeMap<String, f64>,
    pub symbol: String,
    pub start_date: String,
    pub end_date: String,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub initial_capital: f64,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
    pub open_position: Option<Position>,
    pub skipped_entries: usize,
    pub dataset_hash: String,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run a backtest with pre-loaded bars. No I/O.
pub fn run_backtest(bars: &[Bar], request: &BacktestRequest) -> Result<BacktestResult, RunError> {
    let strategy = Strategy::from_params(&request.strategy, &request.params)?;
    let indicators = strategy.compute_indicators(bars);
    run_backtest_with_strategy(bars, &strategy, &indicators, request)
}

/// Run a backtest with an already-resolved strategy and its indicators.
///
/// Used by batch evaluation, which shares indicator values through the cache.
pub fn run_backtest_with_strategy(
    bars: &[Bar],
    strategy: &Strategy,
    indicators: &quantlab_core::IndicatorValues,
    request: &BacktestRequest,
) -> Result<BacktestResult, RunError> {
    let symbol = bars.first().map(|b| b.symbol.clone()).unwrap_or_default();
    tracing::info!(
        strategy = strategy.id(),
        symbol = %symbol,
        bars = bars.len(),
        "Starting backtest."
    );

    let sim = run_simulation_with(bars, strategy, indicators, &request.simulator)?;
    let metrics = PerformanceMetrics::compute(&sim, request.risk_free_rate);

    tracing::info!(
        strategy = strategy.id(),
        trades = metrics.trade_count,
        total_return = metrics.total_return,
        "Backtest finished."
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        strategy: strategy.id().to_string(),
        params: strategy.params(),
        symbol,
        start_date: bars.first().map(|b| b.date.to_string()).unwrap_or_default(),
        end_date: bars.last().map(|b| b.date.to_string()).unwrap_or_default(),
        bar_count: bars.len(),
        warmup_bars: strategy.warmup(),
        initial_capital: sim.initial_capital,
        metrics,
        trades: sim.trades,
        equity_curve: sim.equity_curve,
        open_position: sim.open_position,
        skipped_entries: sim.skipped_entries,
        dataset_hash: dataset_hash(bars),
    })
}
