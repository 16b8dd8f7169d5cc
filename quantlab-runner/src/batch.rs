//! Parallel batch evaluation: parameter grids, symbol sets, and the
//! full set of risk tolerances.
//!
//! Each evaluation borrows its own immutable bar slice. Strategy indicator
//! values go through an injected [`IndicatorCache`] keyed by the full
//! resolved parameter set, so every distinct grid point computes its own
//! indicators once and a repeated sweep over the same bars reuses them.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use quantlab_core::domain::Bar;
use quantlab_core::signal::{score_composite, CompositeReport, RiskTolerance, SignalConfig};
use quantlab_core::{compute_indicators, QuantError, Strategy};

use crate::cache::IndicatorCache;
use crate::runner::{run_backtest_with_strategy, BacktestRequest, BacktestResult, RunError};

/// Cartesian grid of parameter values for one strategy.
///
/// Parameters not named in the grid take their schema defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub strategy: String,
    pub axes: BTreeMap<String, Vec<f64>>,
}

impl ParamGrid {
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            axes: BTreeMap::new(),
        }
    }

    pub fn axis(mut self, param: impl Into<String>, values: Vec<f64>) -> Self {
        self.axes.insert(param.into(), values);
        self
    }

    /// Fast 5/10/20 against slow 20/50/100.
    pub fn ma_cross_default() -> Self {
        Self::new("ma_cross")
            .axis("fast", vec![5.0, 10.0, 20.0])
            .axis("slow", vec![20.0, 50.0, 100.0])
    }

    /// Number of raw combinations, invalid ones included.
    pub fn size(&self) -> usize {
        if self.axes.is_empty() {
            return 1;
        }
        self.axes.values().map(Vec::len).product()
    }

    /// Every combination of axis values.
    pub fn combinations(&self) -> Vec<HashMap<String, f64>> {
        let mut combos = vec![HashMap::new()];
        for (name, values) in &self.axes {
            combos = combos
                .into_iter()
                .flat_map(|base| {
                    values.iter().map(move |&v| {
                        let mut next = base.clone();
                        next.insert(name.clone(), v);
                        next
                    })
                })
                .collect();
        }
        combos
    }

    /// Resolve each combination, dropping those the strategy rejects
    /// (e.g. fast >= slow).
    pub fn strategies(&self) -> Result<Vec<Strategy>, QuantError> {
        // An unknown id is an error for the whole grid, not a skipped point.
        Strategy::with_defaults(&self.strategy)?;
        Ok(self
            .combinations()
            .into_iter()
            .filter_map(|params| match Strategy::from_params(&self.strategy, &params) {
                Ok(strategy) => Some(strategy),
                Err(e) => {
                    tracing::debug!(strategy = %self.strategy, error = %e, "Skipping grid point.");
                    None
                }
            })
            .collect())
    }
}

/// Metric used to rank sweep results. Undefined values rank last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    #[default]
    Sharpe,
    TotalReturn,
    Calmar,
    Sortino,
}

impl RankMetric {
    pub fn value(self, result: &BacktestResult) -> Option<f64> {
        let m = &result.metrics;
        match self {
            RankMetric::Sharpe => m.sharpe,
            RankMetric::TotalReturn => Some(m.total_return),
            RankMetric::Calmar => m.calmar,
            RankMetric::Sortino => m.sortino,
        }
    }
}

impl FromStr for RankMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sharpe" => Ok(RankMetric::Sharpe),
            "total_return" | "return" => Ok(RankMetric::TotalReturn),
            "calmar" => Ok(RankMetric::Calmar),
            "sortino" => Ok(RankMetric::Sortino),
            other => Err(format!("unknown rank metric '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SweepResults {
    results: Vec<BacktestResult>,
}

impl SweepResults {
    pub fn all(&self) -> &[BacktestResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results sorted best-first by `metric`; ties keep grid order.
    pub fn ranked(&self, metric: RankMetric) -> Vec<&BacktestResult> {
        let mut sorted: Vec<&BacktestResult> = self.results.iter().collect();
        sorted.sort_by(|a, b| match (metric.value(a), metric.value(b)) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        sorted
    }

    pub fn top_n(&self, metric: RankMetric, n: usize) -> Vec<&BacktestResult> {
        self.ranked(metric).into_iter().take(n).collect()
    }

    pub fn best(&self, metric: RankMetric) -> Option<&BacktestResult> {
        self.ranked(metric).into_iter().next()
    }
}

/// Batch executor with a shared indicator cache.
#[derive(Clone)]
pub struct BatchRunner {
    cache: Arc<IndicatorCache>,
    parallel: bool,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(Arc::new(IndicatorCache::new()))
    }
}

impl BatchRunner {
    pub fn new(cache: Arc<IndicatorCache>) -> Self {
        Self { cache, parallel: true }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn cache(&self) -> &IndicatorCache {
        &self.cache
    }

    fn run_one(&self, bars: &[Bar], strategy: &Strategy, base: &BacktestRequest) -> Result<BacktestResult, RunError> {
        let indicators = self.cache.strategy_indicators(bars, strategy);
        run_backtest_with_strategy(bars, strategy, &indicators, base)
    }

    /// Backtest every valid grid point over one bar series.
    ///
    /// `base` supplies the simulator settings and risk-free rate; its
    /// strategy and params are ignored.
    pub fn sweep(&self, bars: &[Bar], grid: &ParamGrid, base: &BacktestRequest) -> Result<SweepResults, RunError> {
        let strategies = grid.strategies()?;
        tracing::info!(
            strategy = %grid.strategy,
            points = strategies.len(),
            skipped = grid.size() - strategies.len(),
            parallel = self.parallel,
            "Starting parameter sweep."
        );

        let results = if self.parallel {
            strategies
                .par_iter()
                .map(|s| self.run_one(bars, s, base))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            strategies
                .iter()
                .map(|s| self.run_one(bars, s, base))
                .collect::<Result<Vec<_>, _>>()?
        };

        let stats = self.cache.stats();
        tracing::info!(
            results = results.len(),
            cache_hits = stats.hits,
            cache_misses = stats.misses,
            "Parameter sweep finished."
        );
        Ok(SweepResults { results })
    }

    /// Run the same request over several symbols' bar series.
    pub fn run_symbols(&self, datasets: &[Vec<Bar>], request: &BacktestRequest) -> Result<Vec<BacktestResult>, RunError> {
        let strategy = Strategy::from_params(&request.strategy, &request.params)?;
        tracing::info!(strategy = strategy.id(), symbols = datasets.len(), "Starting multi-symbol batch.");

        if self.parallel {
            datasets
                .par_iter()
                .map(|bars| self.run_one(bars, &strategy, request))
                .collect()
        } else {
            datasets
                .iter()
                .map(|bars| self.run_one(bars, &strategy, request))
                .collect()
        }
    }

    /// Composite signal under every risk tolerance, sharing one indicator pass.
    pub fn signals_all_tolerances(
        &self,
        bars: &[Bar],
        config: &SignalConfig,
    ) -> Result<Vec<(RiskTolerance, CompositeReport)>, QuantError> {
        let indicators = compute_indicators(bars, &config.indicators)?;
        tracing::debug!(bars = bars.len(), "Scoring all risk tolerances.");

        let score = |&tolerance: &RiskTolerance| {
            let cfg = SignalConfig {
                tolerance,
                ..config.clone()
            };
            score_composite(bars, &indicators, &cfg).map(|report| (tolerance, report))
        };
        if self.parallel {
            RiskTolerance::ALL.par_iter().map(score).collect()
        } else {
            RiskTolerance::ALL.iter().map(score).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::{generate_synthetic, SyntheticSpec};
    use crate::runner::run_backtest;

    fn bars(symbol: &str, seed: u64) -> Vec<Bar> {
        generate_synthetic(&SyntheticSpec::new(symbol, 400, seed)).unwrap()
    }

    #[test]
    fn combinations_cover_the_grid() {
        let grid = ParamGrid::ma_cross_default();
        assert_eq!(grid.size(), 9);
        assert_eq!(grid.combinations().len(), 9);
        assert_eq!(ParamGrid::new("macd").combinations().len(), 1);
    }

    #[test]
    fn invalid_points_are_skipped() {
        // fast=20/slow=20 violates fast < slow.
        let strategies = ParamGrid::ma_cross_default().strategies().unwrap();
        assert_eq!(strategies.len(), 8);
    }

    #[test]
    fn unknown_strategy_fails_the_grid() {
        assert!(ParamGrid::new("nope").strategies().is_err());
    }

    #[test]
    fn parallel_and_sequential_sweeps_agree() {
        let bars = bars("GRID", 3);
        let base = BacktestRequest::new("ma_cross");
        let grid = ParamGrid::ma_cross_default();

        let par = BatchRunner::default().sweep(&bars, &grid, &base).unwrap();
        let seq = BatchRunner::default()
            .with_parallelism(false)
            .sweep(&bars, &grid, &base)
            .unwrap();
        assert_eq!(par.len(), seq.len());
        for (a, b) in par.all().iter().zip(seq.all()) {
            assert_eq!(a.params, b.params);
            assert_eq!(a.metrics.final_equity, b.metrics.final_equity);
        }
    }

    #[test]
    fn sweep_matches_individual_runs() {
        let bars = bars("GRID", 5);
        let base = BacktestRequest::new("ma_cross");
        let results = BatchRunner::default()
            .sweep(&bars, &ParamGrid::ma_cross_default(), &base)
            .unwrap();
        let first = &results.all()[0];
        let mut req = BacktestRequest::new("ma_cross");
        for (k, v) in &first.params {
            req = req.with_param(k, *v);
        }
        let single = run_backtest(&bars, &req).unwrap();
        assert_eq!(single.metrics.final_equity, first.metrics.final_equity);
        assert_eq!(single.trades.len(), first.trades.len());
    }

    #[test]
    fn ranking_puts_undefined_last() {
        let bars = bars("RANK", 9);
        let results = BatchRunner::default()
            .sweep(&bars, &ParamGrid::ma_cross_default(), &BacktestRequest::new("ma_cross"))
            .unwrap();
        let ranked = results.ranked(RankMetric::TotalReturn);
        for pair in ranked.windows(2) {
            assert!(pair[0].metrics.total_return >= pair[1].metrics.total_return);
        }
        let sharpe = results.ranked(RankMetric::Sharpe);
        let first_none = sharpe.iter().position(|r| r.metrics.sharpe.is_none());
        if let Some(i) = first_none {
            assert!(sharpe[i..].iter().all(|r| r.metrics.sharpe.is_none()));
        }
        assert_eq!(results.top_n(RankMetric::Calmar, 3).len(), 3);
    }

    #[test]
    fn multi_symbol_batch_keeps_order() {
        let datasets = vec![bars("AAA", 1), bars("BBB", 2), bars("CCC", 3)];
        let results = BatchRunner::default()
            .run_symbols(&datasets, &BacktestRequest::new("rsi"))
            .unwrap();
        let symbols: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn tolerances_share_one_score() {
        let bars = bars("TOL", 4);
        let reports = BatchRunner::default()
            .signals_all_tolerances(&bars, &SignalConfig::default())
            .unwrap();
        assert_eq!(reports.len(), 3);
        let score = reports[0].1.signal.score;
        for (tolerance, report) in &reports {
            assert_eq!(report.signal.risk_tolerance, *tolerance);
            assert_eq!(report.signal.score, score);
            assert_eq!(report.direction.score, score);
        }
    }

    #[test]
    fn rank_metric_parses() {
        assert_eq!("calmar".parse::<RankMetric>().unwrap(), RankMetric::Calmar);
        assert!("alpha".parse::<RankMetric>().is_err());
    }
}
