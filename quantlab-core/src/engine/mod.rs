//! Backtest simulator: a long-only, single-position state machine driven by
//! one strategy over an ordered bar series.

pub mod accounting;
pub mod loop_runner;
pub mod state;

pub use accounting::Account;
pub use loop_runner::{run_simulation, run_simulation_with};
pub use state::{
    SimState, SimulationResult, SimulatorConfig, DEFAULT_COMMISSION_RATE, DEFAULT_INITIAL_CAPITAL,
    DEFAULT_SLIPPAGE_RATE,
};
