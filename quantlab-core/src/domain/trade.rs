//! TradeRecord: a completed round-trip trade.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A closed long trade: entry → exit. Immutable once appended to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub shares: u64,
    /// Net of commission and slippage on both legs.
    pub pnl: f64,
    /// `pnl` as a percentage of the entry cost.
    pub pnl_pct: f64,
    /// Calendar days between entry and exit.
    pub holding_days: i64,

    pub entry_bar: usize,
    pub exit_bar: usize,
    pub bars_held: usize,
    /// Price difference times shares, before costs.
    pub gross_pnl: f64,
    /// Commission and slippage paid across both legs.
    pub costs: f64,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.pnl < 0.0
    }
}
