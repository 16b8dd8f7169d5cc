//! Technical dimension: RSI, MACD, KDJ and Bollinger readings at the last bar.

use super::component::Factor;
use super::context::ScoringContext;
use crate::indicators::{BollingerBand, KdjLine, MacdLine};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TechnicalFactor {
    RsiOversold(f64),
    RsiOverbought(f64),
    RsiRecovering(f64),
    RsiFading(f64),
    MacdGoldenCross,
    MacdDeathCross,
    HistogramExpandingUp,
    HistogramExpandingDown,
    KdjJOversold(f64),
    KdjJOverbought(f64),
    KdjGoldenCross(f64),
    KdjDeathCross(f64),
    AtLowerBand,
    AtUpperBand,
}

impl Factor for TechnicalFactor {
    fn delta(&self) -> f64 {
        use TechnicalFactor::*;
        match self {
            RsiOversold(_) => 0.4,
            RsiOverbought(_) => -0.4,
            RsiRecovering(_) => 0.2,
            RsiFading(_) => -0.2,
            MacdGoldenCross => 0.5,
            MacdDeathCross => -0.5,
            HistogramExpandingUp => 0.2,
            HistogramExpandingDown => -0.2,
            KdjJOversold(_) => 0.3,
            KdjJOverbought(_) => -0.3,
            KdjGoldenCross(_) => 0.3,
            KdjDeathCross(_) => -0.3,
            AtLowerBand => 0.3,
            AtUpperBand => -0.3,
        }
    }
}

impl fmt::Display for TechnicalFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TechnicalFactor::*;
        match self {
            RsiOversold(v) => write!(f, "RSI oversold ({v:.1})"),
            RsiOverbought(v) => write!(f, "RSI overbought ({v:.1})"),
            RsiRecovering(v) => write!(f, "RSI recovering from weak zone ({v:.1})"),
            RsiFading(v) => write!(f, "RSI fading from strong zone ({v:.1})"),
            MacdGoldenCross => f.write_str("MACD golden cross"),
            MacdDeathCross => f.write_str("MACD death cross"),
            HistogramExpandingUp => f.write_str("MACD histogram expanding above zero"),
            HistogramExpandingDown => f.write_str("MACD histogram expanding below zero"),
            KdjJOversold(j) => write!(f, "KDJ J oversold ({j:.1})"),
            KdjJOverbought(j) => write!(f, "KDJ J overbought ({j:.1})"),
            KdjGoldenCross(k) => write!(f, "KDJ golden cross at K={k:.1}"),
            KdjDeathCross(k) => write!(f, "KDJ death cross at K={k:.1}"),
            AtLowerBand => f.write_str("price at or below lower Bollinger band"),
            AtUpperBand => f.write_str("price at or above upper Bollinger band"),
        }
    }
}

pub fn factors(ctx: &ScoringContext<'_>) -> Vec<TechnicalFactor> {
    let p = ctx.params;
    let mut out = Vec::new();

    let rsi_key = p.rsi_key();
    if let Some(rsi) = ctx.now(&rsi_key) {
        let prev = ctx.back(&rsi_key, 1).unwrap_or(rsi);
        if rsi < 30.0 {
            out.push(TechnicalFactor::RsiOversold(rsi));
        } else if rsi > 70.0 {
            out.push(TechnicalFactor::RsiOverbought(rsi));
        } else if rsi < 45.0 && rsi > prev {
            out.push(TechnicalFactor::RsiRecovering(rsi));
        } else if rsi > 55.0 && rsi < prev {
            out.push(TechnicalFactor::RsiFading(rsi));
        }
    }

    let dif_key = p.macd_key(MacdLine::Dif);
    let dea_key = p.macd_key(MacdLine::Dea);
    if let (Some(dif), Some(dea), Some(pdif), Some(pdea)) = (
        ctx.now(&dif_key),
        ctx.now(&dea_key),
        ctx.back(&dif_key, 1),
        ctx.back(&dea_key, 1),
    ) {
        if dif > dea && pdif <= pdea {
            out.push(TechnicalFactor::MacdGoldenCross);
        } else if dif < dea && pdif >= pdea {
            out.push(TechnicalFactor::MacdDeathCross);
        }
    }

    let hist_key = p.macd_key(MacdLine::Hist);
    if let (Some(hist), Some(prev)) = (ctx.now(&hist_key), ctx.back(&hist_key, 1)) {
        if hist > 0.0 && hist > prev {
            out.push(TechnicalFactor::HistogramExpandingUp);
        } else if hist < 0.0 && hist < prev {
            out.push(TechnicalFactor::HistogramExpandingDown);
        }
    }

    let k_key = p.kdj_key(KdjLine::K);
    let d_key = p.kdj_key(KdjLine::D);
    if let Some(j) = ctx.now(&p.kdj_key(KdjLine::J)) {
        if j < 0.0 {
            out.push(TechnicalFactor::KdjJOversold(j));
        } else if j > 100.0 {
            out.push(TechnicalFactor::KdjJOverbought(j));
        }
    }
    if let (Some(k), Some(d), Some(pk), Some(pd)) = (
        ctx.now(&k_key),
        ctx.now(&d_key),
        ctx.back(&k_key, 1),
        ctx.back(&d_key, 1),
    ) {
        if k > d && pk <= pd {
            if k < 50.0 {
                out.push(TechnicalFactor::KdjGoldenCross(k));
            }
        } else if k < d && pk >= pd && k > 50.0 {
            out.push(TechnicalFactor::KdjDeathCross(k));
        }
    }

    if let (Some(upper), Some(lower)) = (
        ctx.now(&p.boll_key(BollingerBand::Upper)),
        ctx.now(&p.boll_key(BollingerBand::Lower)),
    ) {
        // A collapsed band (zero variance) carries no information.
        if upper > lower {
            let close = ctx.close();
            if close <= lower {
                out.push(TechnicalFactor::AtLowerBand);
            } else if close >= upper {
                out.push(TechnicalFactor::AtUpperBand);
            }
        }
    }

    out
}
