//! Simulator configuration, state machine, and run result types.

use crate::components::strategy::Action;
use crate::domain::{EquityPoint, Position, TradeRecord};
use crate::error::{QuantError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COMMISSION_RATE: f64 = 0.0003;
pub const DEFAULT_SLIPPAGE_RATE: f64 = 0.001;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

/// Configuration for a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub initial_capital: f64,
    /// Fraction of notional charged on each leg.
    pub commission_rate: f64,
    /// Fraction of notional lost to slippage on each leg.
    pub slippage_rate: f64,
    /// Close any open position at the last bar's close and record the trade.
    pub liquidate_at_end: bool,
    /// Fraction of cash committed on entry (default 1.0 = all-in).
    pub position_size_pct: f64,
    /// Share count is rounded down to a multiple of this.
    pub lot_size: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            commission_rate: DEFAULT_COMMISSION_RATE,
            slippage_rate: DEFAULT_SLIPPAGE_RATE,
            liquidate_at_end: false,
            position_size_pct: 1.0,
            lot_size: 1,
        }
    }
}

impl SimulatorConfig {
    pub fn new(initial_capital: f64, commission_rate: f64, slippage_rate: f64) -> Self {
        Self {
            initial_capital,
            commission_rate,
            slippage_rate,
            ..Self::default()
        }
    }

    /// Frictionless config, handy for tests.
    pub fn frictionless(initial_capital: f64) -> Self {
        Self::new(initial_capital, 0.0, 0.0)
    }

    pub fn with_liquidation(mut self, liquidate: bool) -> Self {
        self.liquidate_at_end = liquidate;
        self
    }

    /// Combined per-leg cost rate.
    pub fn cost_rate(&self) -> f64 {
        self.commission_rate + self.slippage_rate
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(QuantError::invalid(format!(
                "initial_capital must be > 0, got {}",
                self.initial_capital
            )));
        }
        for (name, rate) in [
            ("commission_rate", self.commission_rate),
            ("slippage_rate", self.slippage_rate),
        ] {
            if !(rate.is_finite() && (0.0..1.0).contains(&rate)) {
                return Err(QuantError::invalid(format!("{name} must be in [0, 1), got {rate}")));
            }
        }
        if self.cost_rate() >= 1.0 {
            return Err(QuantError::invalid(format!(
                "commission_rate + slippage_rate must be < 1, got {}",
                self.cost_rate()
            )));
        }
        if !(self.position_size_pct > 0.0 && self.position_size_pct <= 1.0) {
            return Err(QuantError::invalid(format!(
                "position_size_pct must be in (0, 1], got {}",
                self.position_size_pct
            )));
        }
        if self.lot_size == 0 {
            return Err(QuantError::invalid("lot_size must be >= 1"));
        }
        Ok(())
    }
}

/// Flat → (Enter) → Long → (Exit) → Flat.
#[derive(Debug, Clone, PartialEq)]
pub enum SimState {
    Flat,
    Long(Position),
}

impl SimState {
    pub fn is_flat(&self) -> bool {
        matches!(self, SimState::Flat)
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            SimState::Flat => None,
            SimState::Long(p) => Some(p),
        }
    }
}

/// Everything a simulation run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub initial_capital: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<TradeRecord>,
    /// Strategy action per bar, before state filtering.
    pub actions: Vec<Action>,
    /// Position still open after the last bar (marked to market only).
    pub open_position: Option<Position>,
    pub final_cash: f64,
    /// Enter actions skipped because the cash could not buy one lot.
    pub skipped_entries: usize,
}

impl SimulationResult {
    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_capital)
    }

    /// Equity values alone, in bar order.
    pub fn equity_values(&self) -> Vec<f64> {
        self.equity_curve.iter().map(|p| p.equity).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimulatorConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_config() {
        assert!(SimulatorConfig::new(0.0, 0.0, 0.0).validate().is_err());
        assert!(SimulatorConfig::new(1000.0, -0.1, 0.0).validate().is_err());
        assert!(SimulatorConfig::new(1000.0, 0.6, 0.5).validate().is_err());
        let mut cfg = SimulatorConfig::default();
        cfg.position_size_pct = 0.0;
        assert!(cfg.validate().is_err());
        let mut cfg = SimulatorConfig::default();
        cfg.lot_size = 0;
        assert!(cfg.validate().is_err());
    }
}
