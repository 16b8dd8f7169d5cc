//! QuantLab Runner: orchestration on top of `quantlab-core`.
//!
//! - Single-backtest runner with performance metrics
//! - TOML run configuration
//! - CSV loading, deterministic synthetic data, dataset fingerprints
//! - Indicator cache keyed by symbol, period, params and as-of date
//! - CSV / JSON / Markdown export
//! - Parallel batch evaluation (parameter grids, symbols, risk tolerances)
//! - Comprehensive signal and risk report

pub mod batch;
pub mod cache;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod report;
pub mod runner;

pub use batch::{BatchRunner, ParamGrid, RankMetric, SweepResults};
pub use cache::{CacheKey, CacheStats, IndicatorCache};
pub use config::{BacktestConfig, ConfigError, RunId};
pub use data_loader::{dataset_hash, generate_synthetic, load_csv, LoadError, LoadOptions, SyntheticSpec};
pub use export::ExportError;
pub use metrics::PerformanceMetrics;
pub use report::{comprehensive_report, ComprehensiveReport, Recommendation, RecommendedAction, RiskLevel};
pub use runner::{run_backtest, BacktestRequest, BacktestResult, RunError, SCHEMA_VERSION};
