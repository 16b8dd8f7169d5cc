//! EquityPoint: one mark-to-market snapshot per bar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub cash: f64,
    pub position_value: f64,
    /// Always `cash + position_value`.
    pub equity: f64,
    pub close: f64,
}

impl EquityPoint {
    pub fn new(date: NaiveDate, cash: f64, position_value: f64, close: f64) -> Self {
        Self {
            date,
            cash,
            position_value,
            equity: cash + position_value,
            close,
        }
    }
}
