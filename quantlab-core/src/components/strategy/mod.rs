//! Strategy rule set: a closed set of long-only entry/exit rules.
//!
//! Every variant maps (bars, indicators, bar index) to one [`Action`] and
//! reads only bar `t` and bar `t - 1`. Parameters are declared per variant
//! as a [`ParamSpec`] schema and validated before any simulation starts.

pub mod bollinger_reversion;
pub mod double_ma;
pub mod kdj_cross;
pub mod ma_cross;
pub mod macd_cross;
pub mod macd_hist;
pub mod params;
pub mod rsi_breakout;

pub use bollinger_reversion::BollingerReversion;
pub use double_ma::DoubleMa;
pub use kdj_cross::KdjCross;
pub use ma_cross::MaCross;
pub use macd_cross::MacdCross;
pub use macd_hist::MacdHist;
pub use params::{ParamSet, ParamSpec};
pub use rsi_breakout::RsiBreakout;

use crate::components::indicator::{Indicator, IndicatorValues};
use crate::domain::Bar;
use crate::error::{QuantError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Per-bar trade action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Enter,
    Exit,
    Hold,
}

/// Behaviour shared by every strategy variant.
pub(crate) trait StrategyRule {
    /// Indicators that must be present in the `IndicatorValues` passed to `evaluate`.
    fn required_indicators(&self) -> Vec<Box<dyn Indicator>>;

    /// Action at bar `t`. Must only read bars `t` and `t - 1`.
    fn evaluate(&self, bars: &[Bar], indicators: &IndicatorValues, t: usize) -> Action;
}

/// A validated strategy with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    MaCross(MaCross),
    DoubleMa(DoubleMa),
    Macd(MacdCross),
    MacdHist(MacdHist),
    Rsi(RsiBreakout),
    Kdj(KdjCross),
    Bollinger(BollingerReversion),
}

/// Catalog entry describing one strategy variant.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    pub id: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

/// All strategy variants with their parameter schemas.
pub fn strategy_catalog() -> Vec<StrategyInfo> {
    vec![
        StrategyInfo {
            id: MaCross::ID,
            description: "fast/slow moving average crossover",
            params: MaCross::SCHEMA,
        },
        StrategyInfo {
            id: DoubleMa::ID,
            description: "moving average crossover filtered by a trend moving average",
            params: DoubleMa::SCHEMA,
        },
        StrategyInfo {
            id: MacdCross::ID,
            description: "MACD DIF/DEA crossover",
            params: MacdCross::SCHEMA,
        },
        StrategyInfo {
            id: MacdHist::ID,
            description: "MACD histogram sign flip",
            params: MacdHist::SCHEMA,
        },
        StrategyInfo {
            id: RsiBreakout::ID,
            description: "RSI oversold/overbought breakout",
            params: RsiBreakout::SCHEMA,
        },
        StrategyInfo {
            id: KdjCross::ID,
            description: "KDJ K/D crossover around the midline",
            params: KdjCross::SCHEMA,
        },
        StrategyInfo {
            id: BollingerReversion::ID,
            description: "Bollinger band mean reversion",
            params: BollingerReversion::SCHEMA,
        },
    ]
}

impl Strategy {
    /// Build a strategy from its id and raw parameter values.
    pub fn from_params(id: &str, raw: &HashMap<String, f64>) -> Result<Self> {
        let schema = Self::schema(id).ok_or_else(|| QuantError::UnknownStrategy(id.to_string()))?;
        let p = ParamSet::resolve(id, schema, raw)?;
        Ok(match id {
            MaCross::ID => Strategy::MaCross(MaCross::from_params(&p)?),
            DoubleMa::ID => Strategy::DoubleMa(DoubleMa::from_params(&p)?),
            MacdCross::ID => Strategy::Macd(MacdCross::from_params(&p)?),
            MacdHist::ID => Strategy::MacdHist(MacdHist::from_params(&p)?),
            RsiBreakout::ID => Strategy::Rsi(RsiBreakout::from_params(&p)?),
            KdjCross::ID => Strategy::Kdj(KdjCross::from_params(&p)?),
            BollingerReversion::ID => Strategy::Bollinger(BollingerReversion::from_params(&p)?),
            other => return Err(QuantError::UnknownStrategy(other.to_string())),
        })
    }

    /// Strategy with all-default parameters.
    pub fn with_defaults(id: &str) -> Result<Self> {
        Self::from_params(id, &HashMap::new())
    }

    pub fn schema(id: &str) -> Option<&'static [ParamSpec]> {
        strategy_catalog().into_iter().find(|s| s.id == id).map(|s| s.params)
    }

    pub fn id(&self) -> &'static str {
        match self {
            Strategy::MaCross(_) => MaCross::ID,
            Strategy::DoubleMa(_) => DoubleMa::ID,
            Strategy::Macd(_) => MacdCross::ID,
            Strategy::MacdHist(_) => MacdHist::ID,
            Strategy::Rsi(_) => RsiBreakout::ID,
            Strategy::Kdj(_) => KdjCross::ID,
            Strategy::Bollinger(_) => BollingerReversion::ID,
        }
    }

    /// Resolved parameter values, keyed by name.
    pub fn params(&self) -> BTreeMap<String, f64> {
        let pairs: Vec<(&str, f64)> = match self {
            Strategy::MaCross(s) => vec![("fast", s.fast as f64), ("slow", s.slow as f64)],
            Strategy::DoubleMa(s) => vec![
                ("fast", s.fast as f64),
                ("slow", s.slow as f64),
                ("trend", s.trend as f64),
            ],
            Strategy::Macd(MacdCross { fast, slow, signal })
            | Strategy::MacdHist(MacdHist { fast, slow, signal }) => vec![
                ("fast", *fast as f64),
                ("slow", *slow as f64),
                ("signal", *signal as f64),
            ],
            Strategy::Rsi(s) => vec![
                ("period", s.period as f64),
                ("oversold", s.oversold),
                ("overbought", s.overbought),
            ],
            Strategy::Kdj(s) => vec![("n", s.n as f64), ("m1", s.m1 as f64), ("m2", s.m2 as f64)],
            Strategy::Bollinger(s) => vec![("period", s.period as f64), ("std_dev", s.std_dev)],
        };
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    fn rule(&self) -> &dyn StrategyRule {
        match self {
            Strategy::MaCross(s) => s,
            Strategy::DoubleMa(s) => s,
            Strategy::Macd(s) => s,
            Strategy::MacdHist(s) => s,
            Strategy::Rsi(s) => s,
            Strategy::Kdj(s) => s,
            Strategy::Bollinger(s) => s,
        }
    }

    pub fn required_indicators(&self) -> Vec<Box<dyn Indicator>> {
        self.rule().required_indicators()
    }

    /// Index of the first bar at which every required indicator is defined.
    pub fn warmup(&self) -> usize {
        self.required_indicators()
            .iter()
            .map(|i| i.lookback())
            .max()
            .unwrap_or(0)
    }

    /// Compute exactly the indicators this strategy reads.
    pub fn compute_indicators(&self, bars: &[Bar]) -> IndicatorValues {
        let mut values = IndicatorValues::new();
        values.extend_from(bars, &self.required_indicators());
        values
    }

    /// Action at bar `t`. Out-of-range indices yield `Hold`.
    pub fn evaluate(&self, bars: &[Bar], indicators: &IndicatorValues, t: usize) -> Action {
        if t >= bars.len() {
            return Action::Hold;
        }
        self.rule().evaluate(bars, indicators, t)
    }

    /// One action per bar.
    pub fn evaluate_all(&self, bars: &[Bar], indicators: &IndicatorValues) -> Vec<Action> {
        (0..bars.len()).map(|t| self.evaluate(bars, indicators, t)).collect()
    }
}

// ─── Cross detection ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cross {
    Up,
    Down,
    None,
}

/// Cross of line `a` over line `b` at bar `t`.
///
/// When the previous bar has no value for either line, the first defined
/// relationship counts as a fresh cross: a series whose fast line is already
/// above its slow line at the end of warm-up produces one `Up` there.
pub(crate) fn line_cross(ind: &IndicatorValues, a: &str, b: &str, t: usize) -> Cross {
    let (Some(a_now), Some(b_now)) = (ind.get(a, t), ind.get(b, t)) else {
        return Cross::None;
    };
    let prev = t
        .checked_sub(1)
        .and_then(|p| Some((ind.get(a, p)?, ind.get(b, p)?)));
    classify_cross(prev, (a_now, b_now))
}

/// Sign change of a single line around zero, with the same warm-up rule.
pub(crate) fn zero_cross(ind: &IndicatorValues, a: &str, t: usize) -> Cross {
    let Some(now) = ind.get(a, t) else {
        return Cross::None;
    };
    let prev = t.checked_sub(1).and_then(|p| ind.get(a, p)).map(|v| (v, 0.0));
    classify_cross(prev, (now, 0.0))
}

fn classify_cross(prev: Option<(f64, f64)>, (a, b): (f64, f64)) -> Cross {
    match prev {
        Some((pa, pb)) if a > b && pa <= pb => Cross::Up,
        Some((pa, pb)) if a < b && pa >= pb => Cross::Down,
        Some(_) => Cross::None,
        None if a > b => Cross::Up,
        None if a < b => Cross::Down,
        None => Cross::None,
    }
}
