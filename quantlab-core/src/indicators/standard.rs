//! The standard indicator set consumed by the composite signal engine and
//! exposed through `compute_indicators`.

use super::*;
use crate::components::indicator::{Indicator, IndicatorValues};
use crate::domain::{validate_bars, Bar};
use crate::error::{QuantError, Result};
use serde::{Deserialize, Serialize};

/// Parameters of the standard indicator set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub ma_periods: Vec<usize>,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi_period: usize,
    pub kdj_n: usize,
    pub kdj_m1: usize,
    pub kdj_m2: usize,
    pub boll_period: usize,
    pub boll_k: f64,
    pub atr_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ma_periods: vec![5, 10, 20, 60],
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            rsi_period: 14,
            kdj_n: 9,
            kdj_m1: 3,
            kdj_m2: 3,
            boll_period: 20,
            boll_k: 2.0,
            atr_period: 14,
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("rsi_period", self.rsi_period),
            ("kdj_n", self.kdj_n),
            ("kdj_m1", self.kdj_m1),
            ("kdj_m2", self.kdj_m2),
            ("boll_period", self.boll_period),
            ("atr_period", self.atr_period),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(QuantError::invalid(format!("{name} must be >= 1")));
            }
        }
        if self.ma_periods.iter().any(|&p| p == 0) {
            return Err(QuantError::invalid("ma_periods must all be >= 1"));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(QuantError::invalid(format!(
                "macd_fast ({}) must be < macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if !(self.boll_k.is_finite() && self.boll_k > 0.0) {
            return Err(QuantError::invalid(format!("boll_k must be > 0, got {}", self.boll_k)));
        }
        Ok(())
    }

    pub fn ma_key(period: usize) -> String {
        Sma::new(period).name().to_string()
    }

    pub fn rsi_key(&self) -> String {
        Rsi::new(self.rsi_period).name().to_string()
    }

    pub fn macd_key(&self, line: MacdLine) -> String {
        Macd::new(self.macd_fast, self.macd_slow, self.macd_signal, line)
            .name()
            .to_string()
    }

    pub fn kdj_key(&self, line: KdjLine) -> String {
        Kdj::new(self.kdj_n, self.kdj_m1, self.kdj_m2, line).name().to_string()
    }

    pub fn boll_key(&self, band: BollingerBand) -> String {
        Bollinger::new(self.boll_period, self.boll_k, band).name().to_string()
    }

    pub fn atr_key(&self) -> String {
        Atr::new(self.atr_period).name().to_string()
    }

    /// Indicator instances for the full standard set.
    pub fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        let mut out: Vec<Box<dyn Indicator>> = Vec::new();
        for &p in &self.ma_periods {
            out.push(Box::new(Sma::new(p)));
        }
        for line in [MacdLine::Dif, MacdLine::Dea, MacdLine::Hist] {
            out.push(Box::new(Macd::new(
                self.macd_fast,
                self.macd_slow,
                self.macd_signal,
                line,
            )));
        }
        out.push(Box::new(Rsi::new(self.rsi_period)));
        for line in [KdjLine::K, KdjLine::D, KdjLine::J] {
            out.push(Box::new(Kdj::new(self.kdj_n, self.kdj_m1, self.kdj_m2, line)));
        }
        for band in [BollingerBand::Upper, BollingerBand::Middle, BollingerBand::Lower] {
            out.push(Box::new(Bollinger::new(self.boll_period, self.boll_k, band)));
        }
        out.push(Box::new(Atr::new(self.atr_period)));
        out
    }
}

/// Validate the bars and compute the standard indicator set.
pub fn compute_indicators(bars: &[Bar], params: &IndicatorParams) -> Result<IndicatorValues> {
    validate_bars(bars)?;
    params.validate()?;
    let mut values = IndicatorValues::new();
    values.extend_from(bars, &params.indicators());
    Ok(values)
}
