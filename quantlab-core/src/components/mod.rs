//! Building blocks evaluated per bar: indicators and strategy rules.

pub mod indicator;
pub mod strategy;
