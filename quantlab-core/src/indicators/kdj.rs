//! KDJ stochastic oscillator.
//!
//! - RSV = (close - lowest_low(n)) / (highest_high(n) - lowest_low(n)) * 100,
//!   or 0 when the window has no range
//! - K = EMA(RSV, m1)
//! - D = EMA(K, m2)
//! - J = 3K - 2D (unbounded)
//!
//! Each line is a separate Indicator instance.

use super::ema::ema_of_series;
use crate::components::indicator::{Indicator, Series};
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdjLine {
    K,
    D,
    J,
}

#[derive(Debug, Clone)]
pub struct Kdj {
    n: usize,
    m1: usize,
    m2: usize,
    line: KdjLine,
    name: String,
}

impl Kdj {
    pub fn new(n: usize, m1: usize, m2: usize, line: KdjLine) -> Self {
        let prefix = match line {
            KdjLine::K => "kdj_k",
            KdjLine::D => "kdj_d",
            KdjLine::J => "kdj_j",
        };
        Self {
            n,
            m1,
            m2,
            line,
            name: format!("{prefix}_{n}_{m1}_{m2}"),
        }
    }

    pub fn k(n: usize, m1: usize, m2: usize) -> Self {
        Self::new(n, m1, m2, KdjLine::K)
    }

    pub fn d(n: usize, m1: usize, m2: usize) -> Self {
        Self::new(n, m1, m2, KdjLine::D)
    }

    pub fn j(n: usize, m1: usize, m2: usize) -> Self {
        Self::new(n, m1, m2, KdjLine::J)
    }
}

impl Indicator for Kdj {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let k = self.n.saturating_sub(1) + self.m1.saturating_sub(1);
        match self.line {
            KdjLine::K => k,
            KdjLine::D | KdjLine::J => k + self.m2.saturating_sub(1),
        }
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let (k, d, j) = kdj_lines(bars, self.n, self.m1, self.m2);
        match self.line {
            KdjLine::K => k,
            KdjLine::D => d,
            KdjLine::J => j,
        }
    }
}

/// Raw stochastic value over the trailing `n` bars.
pub fn rsv(bars: &[Bar], n: usize) -> Series {
    let len = bars.len();
    let mut result = vec![None; len];
    if n == 0 || len < n {
        return result;
    }
    for i in (n - 1)..len {
        let window = &bars[i + 1 - n..=i];
        let high = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let low = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        let range = high - low;
        result[i] = Some(if range > 0.0 {
            (bars[i].close - low) / range * 100.0
        } else {
            0.0
        });
    }
    result
}

/// Compute K, D and J at once.
pub fn kdj_lines(bars: &[Bar], n: usize, m1: usize, m2: usize) -> (Series, Series, Series) {
    let k = ema_of_series(&rsv(bars, n), m1);
    let d = ema_of_series(&k, m2);
    let j = k
        .iter()
        .zip(&d)
        .map(|(k, d)| Some(3.0 * (*k)? - 2.0 * (*d)?))
        .collect();
    (k, d, j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn warmup_is_absent() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 5) as f64).collect();
        let bars = make_bars(&closes);
        let (k, d, j) = kdj_lines(&bars, 9, 3, 3);
        // RSV from 8, K from 10, D and J from 12
        assert!(k[..10].iter().all(Option::is_none));
        assert!(k[10].is_some());
        assert!(d[..12].iter().all(Option::is_none));
        assert!(d[12].is_some());
        assert!(j[11].is_none() && j[12].is_some());
        assert_eq!(Kdj::j(9, 3, 3).lookback(), 12);
    }

    #[test]
    fn zero_range_rsv_is_zero() {
        let mut bars = make_bars(&[10.0; 12]);
        for b in &mut bars {
            b.high = 10.0;
            b.low = 10.0;
            b.open = 10.0;
        }
        let values = rsv(&bars, 9);
        assert_eq!(values[8], Some(0.0));
        let (k, d, j) = kdj_lines(&bars, 9, 3, 3);
        assert_approx(k[11].unwrap(), 0.0, DEFAULT_EPSILON);
        assert_approx(d[11].unwrap_or(0.0), 0.0, DEFAULT_EPSILON);
        assert_eq!(j[11], None);
    }

    #[test]
    fn close_at_top_of_range_is_100() {
        // Rising closes: bar i has high = 101 + i, low = 98 + i.
        let closes: Vec<f64> = (0..12).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let values = rsv(&bars, 3);
        // window 9..=11: high = 112, low = 107 → (111 - 107) / 5 * 100 = 80
        assert_approx(values[11].unwrap(), 80.0, DEFAULT_EPSILON);
    }

    #[test]
    fn j_equals_3k_minus_2d() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + ((i * 3) % 7) as f64).collect();
        let bars = make_bars(&closes);
        let (k, d, j) = kdj_lines(&bars, 9, 3, 3);
        for i in 12..40 {
            assert_approx(j[i].unwrap(), 3.0 * k[i].unwrap() - 2.0 * d[i].unwrap(), DEFAULT_EPSILON);
        }
    }
}
