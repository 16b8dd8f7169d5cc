//! Position: the simulator's single open long holding.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An open long position. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub shares: u64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub entry_bar: usize,
    /// Cash debited on entry, including commission and slippage.
    pub entry_cost: f64,
}

impl Position {
    /// Mark-to-market value at `price`.
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }
}
