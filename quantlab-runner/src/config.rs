//! Serializable run configuration, loaded from TOML.
//!
//! ```toml
//! [data]
//! csv = "data/spy.csv"          # or: synthetic = { symbol = "SPY", bars = 750, seed = 42 }
//!
//! [backtest]
//! initial_capital = 100000.0
//! commission_rate = 0.0003
//! slippage_rate = 0.001
//! liquidate_at_end = true
//!
//! [strategy]
//! id = "ma_cross"
//! params = { fast = 10, slow = 30 }
//!
//! [signal]
//! tolerance = "aggressive"
//!
//! [risk]
//! forward_days = 10
//! confidence_levels = [0.68, 0.95, 0.99]
//! ```
//!
//! Every section and field is optional. Range checks are left to the core
//! constructors so there is one source of truth for what is valid.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quantlab_core::engine::SimulatorConfig;
use quantlab_core::risk::RiskConfig;
use quantlab_core::signal::SignalConfig;
use quantlab_core::{QuantError, Strategy};

use crate::data_loader::SyntheticSpec;
use crate::runner::BacktestRequest;

/// Unique identifier for a run configuration (content hash).
pub type RunId = String;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] QuantError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub data: DataSection,
    pub backtest: BacktestSection,
    pub strategy: StrategySection,
    pub signal: SignalConfig,
    pub risk: RiskConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    pub csv: Option<PathBuf>,
    pub symbol: Option<String>,
    pub synthetic: Option<SyntheticSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticSection {
    pub symbol: String,
    pub bars: usize,
    pub seed: u64,
}

impl Default for SyntheticSection {
    fn default() -> Self {
        Self {
            symbol: "SYNTH".to_string(),
            bars: 750,
            seed: 42,
        }
    }
}

impl SyntheticSection {
    pub fn to_spec(&self) -> SyntheticSpec {
        SyntheticSpec::new(self.symbol.clone(), self.bars, self.seed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSection {
    #[serde(flatten)]
    pub simulator: SimulatorConfig,
    pub risk_free_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySection {
    pub id: String,
    pub params: BTreeMap<String, f64>,
}

impl StrategySection {
    pub fn param_map(&self) -> HashMap<String, f64> {
        self.params.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

impl Default for StrategySection {
    fn default() -> Self {
        Self {
            id: "ma_cross".to_string(),
            params: BTreeMap::new(),
        }
    }
}

impl BacktestConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), strategy = %config.strategy.id, "Loaded configuration.");
        Ok(config)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Run every section through its core validator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backtest.simulator.validate()?;
        Strategy::from_params(&self.strategy.id, &self.strategy.param_map())?;
        self.signal.validate()?;
        self.risk.validate()?;
        Ok(())
    }

    pub fn to_request(&self) -> BacktestRequest {
        BacktestRequest {
            strategy: self.strategy.id.clone(),
            params: self.strategy.param_map(),
            simulator: self.backtest.simulator.clone(),
            risk_free_rate: self.backtest.risk_free_rate,
        }
    }

    /// Deterministic content hash: two identical configs share a RunId.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let canonical = self.to_toml()?;
        Ok(blake3::hash(canonical.as_bytes()).to_hex().to_string())
    }
}
