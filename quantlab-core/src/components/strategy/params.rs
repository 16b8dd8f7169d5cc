//! Parameter schemas and validated parameter sets.

use crate::error::{QuantError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Declared parameter: name, default, inclusive [min, max].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
    /// Whole numbers only (window lengths).
    pub integer: bool,
    pub description: &'static str,
}

impl ParamSpec {
    pub const fn int(name: &'static str, default: f64, min: f64, max: f64, description: &'static str) -> Self {
        Self {
            name,
            default,
            min,
            max,
            integer: true,
            description,
        }
    }

    pub const fn float(name: &'static str, default: f64, min: f64, max: f64, description: &'static str) -> Self {
        Self {
            name,
            default,
            min,
            max,
            integer: false,
            description,
        }
    }
}

/// Parameter values resolved against a schema: every declared name present,
/// every value within range.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSet {
    values: BTreeMap<&'static str, f64>,
}

impl ParamSet {
    /// Resolve raw caller-supplied values against `schema`.
    ///
    /// Missing names take the declared default. A window parameter is also
    /// accepted under its long form, so `fast_period` sets `fast`. Unknown
    /// names, a name given in both forms, non-finite values, fractional
    /// values for integer parameters, and out-of-range values are rejected.
    pub fn resolve(strategy: &str, schema: &[ParamSpec], raw: &HashMap<String, f64>) -> Result<Self> {
        let mut supplied: BTreeMap<&'static str, f64> = BTreeMap::new();
        for (key, &value) in raw {
            let spec = lookup(schema, key).ok_or_else(|| QuantError::UnknownParam {
                strategy: strategy.to_string(),
                param: key.clone(),
            })?;
            if supplied.insert(spec.name, value).is_some() {
                return Err(QuantError::invalid(format!(
                    "parameter '{}' of strategy '{strategy}' given more than once",
                    spec.name
                )));
            }
        }

        let mut values = BTreeMap::new();
        for spec in schema {
            let value = supplied.get(spec.name).copied().unwrap_or(spec.default);
            let out_of_range = QuantError::ParamOutOfRange {
                strategy: strategy.to_string(),
                param: spec.name.to_string(),
                value,
                min: spec.min,
                max: spec.max,
            };
            if !value.is_finite() || value < spec.min || value > spec.max {
                return Err(out_of_range);
            }
            if spec.integer && value.fract() != 0.0 {
                return Err(QuantError::invalid(format!(
                    "parameter '{}' of strategy '{strategy}' must be a whole number, got {value}",
                    spec.name
                )));
            }
            values.insert(spec.name, value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(f64::NAN)
    }

    /// Integer parameter as a window length.
    pub fn period(&self, name: &str) -> usize {
        self.get(name) as usize
    }

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.values.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }
}

/// Schema entry for `key`, by short name or `{name}_period` for windows.
fn lookup<'a>(schema: &'a [ParamSpec], key: &str) -> Option<&'a ParamSpec> {
    schema.iter().find(|s| {
        s.name == key
            || (s.integer && !s.name.ends_with("period") && key.strip_suffix("_period") == Some(s.name))
    })
}

/// Fail with `InvalidInput` unless `a < b`.
pub(crate) fn require_ordered(strategy: &str, a: (&str, usize), b: (&str, usize)) -> Result<()> {
    if a.1 >= b.1 {
        return Err(QuantError::invalid(format!(
            "strategy '{strategy}': {} ({}) must be less than {} ({})",
            a.0, a.1, b.0, b.1
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &[ParamSpec] = &[
        ParamSpec::int("period", 14.0, 5.0, 50.0, "window"),
        ParamSpec::float("mult", 2.0, 1.0, 3.0, "multiplier"),
    ];

    fn raw(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn defaults_fill_missing() {
        let set = ParamSet::resolve("x", SCHEMA, &raw(&[("mult", 2.5)])).unwrap();
        assert_eq!(set.period("period"), 14);
        assert_eq!(set.get("mult"), 2.5);
    }

    #[test]
    fn out_of_range_rejected() {
        let err = ParamSet::resolve("x", SCHEMA, &raw(&[("period", 4.0)])).unwrap_err();
        assert!(matches!(err, QuantError::ParamOutOfRange { ref param, .. } if param == "period"));
    }

    #[test]
    fn unknown_rejected() {
        let err = ParamSet::resolve("x", SCHEMA, &raw(&[("bogus", 1.0)])).unwrap_err();
        assert!(matches!(err, QuantError::UnknownParam { .. }));
    }

    #[test]
    fn fractional_integer_rejected() {
        assert!(ParamSet::resolve("x", SCHEMA, &raw(&[("period", 14.5)])).is_err());
    }

    #[test]
    fn nan_rejected() {
        assert!(ParamSet::resolve("x", SCHEMA, &raw(&[("mult", f64::NAN)])).is_err());
    }

    const WINDOWS: &[ParamSpec] = &[
        ParamSpec::int("fast", 5.0, 2.0, 60.0, "fast"),
        ParamSpec::int("slow", 20.0, 5.0, 250.0, "slow"),
        ParamSpec::float("band", 2.0, 1.0, 3.0, "band"),
    ];

    #[test]
    fn long_window_names_are_accepted() {
        let set = ParamSet::resolve("x", WINDOWS, &raw(&[("fast_period", 10.0), ("slow_period", 30.0)])).unwrap();
        assert_eq!(set.period("fast"), 10);
        assert_eq!(set.period("slow"), 30);
        assert_eq!(set.to_map().keys().collect::<Vec<_>>(), ["band", "fast", "slow"]);
    }

    #[test]
    fn both_forms_of_one_name_rejected() {
        let err = ParamSet::resolve("x", WINDOWS, &raw(&[("fast", 8.0), ("fast_period", 10.0)])).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[test]
    fn long_form_only_applies_to_windows() {
        let err = ParamSet::resolve("x", WINDOWS, &raw(&[("band_period", 2.0)])).unwrap_err();
        assert!(matches!(err, QuantError::UnknownParam { ref param, .. } if param == "band_period"));
        let err = ParamSet::resolve("x", SCHEMA, &raw(&[("period_period", 14.0)])).unwrap_err();
        assert!(matches!(err, QuantError::UnknownParam { .. }));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(ParamSet::resolve("x", SCHEMA, &raw(&[("period", 5.0), ("mult", 3.0)])).is_ok());
    }
}
