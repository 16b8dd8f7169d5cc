//! Concrete indicator implementations.
//!
//! Every indicator implements the `Indicator` trait from `components::indicator`
//! and produces one `Option<f64>` per bar, `None` in the warm-up region.
//!
//! Multi-line indicators (MACD, KDJ, Bollinger) are exposed as separate named
//! instances per line, keeping the single-series `Indicator` trait unchanged.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod kdj;
pub mod macd;
pub mod regression;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod standard;
pub mod volatility;
pub mod volume_ratio;

pub use atr::{true_range, Atr};
pub use bollinger::{Bollinger, BollingerBand};
pub use ema::{ema_of_series, Ema};
pub use kdj::{kdj_lines, Kdj, KdjLine};
pub use macd::{macd_lines, Macd, MacdLine};
pub use regression::LinRegSlope;
pub use roc::Roc;
pub use rsi::Rsi;
pub use sma::{sma_of_series, Sma};
pub use standard::{compute_indicators, IndicatorParams};
pub use volatility::{RealizedVol, TRADING_DAYS_PER_YEAR};
pub use volume_ratio::VolumeRatio;

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Bar {
                symbol: "TEST".to_string(),
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
