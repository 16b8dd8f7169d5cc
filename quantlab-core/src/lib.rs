//! QuantLab Core: indicators, strategies, simulator, signal engine, risk estimator.
//!
//! This crate is pure computation over an ordered daily bar series:
//! - Domain types (bars, positions, trades, equity points)
//! - Technical indicator library with `None` warm-up semantics
//! - Closed set of parameterised entry/exit strategies
//! - Long-only single-position backtest simulator with costs
//! - Five-dimension composite signal engine with direction and trade signals
//! - Volatility, tail-risk and price-target estimation

pub mod components;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod risk;
pub mod signal;
pub mod stats;

pub use components::indicator::{Indicator, IndicatorValues};
pub use components::strategy::{strategy_catalog, Action, Strategy, StrategyInfo};
pub use domain::{validate_bars, Bar, EquityPoint, Position, TradeRecord};
pub use engine::{run_simulation, SimulationResult, SimulatorConfig};
pub use error::{ErrorKind, QuantError, Result};
pub use indicators::{compute_indicators, IndicatorParams};
pub use risk::{estimate_price_targets, estimate_risk, PriceTargets, RiskConfig, RiskEstimate};
pub use signal::{score_composite, CompositeReport, RiskTolerance, SignalConfig};
