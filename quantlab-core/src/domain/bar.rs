//! Bar: the fundamental market data unit.

use crate::error::{QuantError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any price field is not finite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite())
    }

    /// Basic OHLCV sanity check: finite, positive prices, high >= low, non-negative volume.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.low > 0.0
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }
}

/// Validate an ordered bar series.
///
/// Dates must be strictly ascending (duplicates rejected) and every bar must
/// pass [`Bar::is_sane`]. Validation happens up front so that no computation
/// ever runs on a partially bad series.
pub fn validate_bars(bars: &[Bar]) -> Result<()> {
    if bars.is_empty() {
        return Err(QuantError::invalid("bar series is empty"));
    }
    for (i, bar) in bars.iter().enumerate() {
        if !bar.is_sane() {
            return Err(QuantError::InvalidBars {
                index: i,
                reason: format!(
                    "malformed OHLCV (o={}, h={}, l={}, c={}, v={})",
                    bar.open, bar.high, bar.low, bar.close, bar.volume
                ),
            });
        }
        if i > 0 {
            let prev = bars[i - 1].date;
            if bar.date == prev {
                return Err(QuantError::InvalidBars {
                    index: i,
                    reason: format!("duplicate date {}", bar.date),
                });
            }
            if bar.date < prev {
                return Err(QuantError::InvalidBars {
                    index: i,
                    reason: format!("date {} precedes {}", bar.date, prev),
                });
            }
        }
    }
    Ok(())
}

/// Close prices of a bar slice.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
