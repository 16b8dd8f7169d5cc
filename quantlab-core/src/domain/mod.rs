//! Domain types: bars, positions, trades, equity snapshots.

pub mod bar;
pub mod equity;
pub mod position;
pub mod trade;

pub use bar::{closes, validate_bars, Bar};
pub use equity::EquityPoint;
pub use position::Position;
pub use trade::TradeRecord;
