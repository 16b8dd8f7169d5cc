//! Error taxonomy shared by every core operation.
//!
//! Two families of failure exist: the input was malformed (bad bars, bad
//! parameters) or there was not enough history for the requested feature.
//! Degenerate ratios are not errors; they surface as `None` in the output
//! types.

use thiserror::Error;

/// Coarse classification of a [`QuantError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantError {
    #[error("invalid bar at index {index}: {reason}")]
    InvalidBars { index: usize, reason: String },

    #[error("parameter '{param}' of strategy '{strategy}' is {value}, outside [{min}, {max}]")]
    ParamOutOfRange {
        strategy: String,
        param: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown strategy: '{0}'")]
    UnknownStrategy(String),

    #[error("unknown parameter '{param}' for strategy '{strategy}'")]
    UnknownParam { strategy: String, param: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient data for {feature}: requires at least {required} bars, got {actual}")]
    InsufficientData {
        feature: &'static str,
        required: usize,
        actual: usize,
    },
}

impl QuantError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuantError::InsufficientData { .. } => ErrorKind::InsufficientData,
            _ => ErrorKind::InvalidInput,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        QuantError::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, QuantError>;

/// Reject a bar series shorter than `required`.
pub fn require_bars(feature: &'static str, required: usize, actual: usize) -> Result<()> {
    if actual < required {
        return Err(QuantError::InsufficientData {
            feature,
            required,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_states_minimum() {
        let err = require_bars("trading signal", 60, 42).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
        let msg = err.to_string();
        assert!(msg.contains("60"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn enough_bars_is_ok() {
        assert!(require_bars("direction", 60, 60).is_ok());
    }

    #[test]
    fn param_errors_are_invalid_input() {
        let err = QuantError::ParamOutOfRange {
            strategy: "ma_cross".into(),
            param: "fast".into(),
            value: 1.0,
            min: 2.0,
            max: 60.0,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(QuantError::UnknownStrategy("x".into()).kind(), ErrorKind::InvalidInput);
    }
}
