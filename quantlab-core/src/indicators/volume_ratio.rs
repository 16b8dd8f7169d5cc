//! Volume ratio: today's volume over the trailing mean volume (including today).
//! Lookback: period - 1. Undefined when the trailing mean is zero.

use crate::components::indicator::{Indicator, Series};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct VolumeRatio {
    period: usize,
    name: String,
}

impl VolumeRatio {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("volume_ratio_{period}"),
        }
    }
}

impl Indicator for VolumeRatio {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let n = bars.len();
        let mut result = vec![None; n];
        if self.period == 0 || n < self.period {
            return result;
        }
        for i in (self.period - 1)..n {
            let avg = bars[i + 1 - self.period..=i].iter().map(|b| b.volume).sum::<f64>()
                / self.period as f64;
            if avg > 0.0 {
                result[i] = Some(bars[i].volume / avg);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn spike_ratio() {
        let mut bars = make_bars(&[10.0; 5]);
        bars[4].volume = 5000.0;
        // mean(1000 * 4 + 5000) / 5 = 1800
        let result = VolumeRatio::new(5).compute(&bars);
        assert_eq!(result[3], None);
        assert_approx(result[4].unwrap(), 5000.0 / 1800.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_volume_is_undefined() {
        let mut bars = make_bars(&[10.0; 3]);
        for b in &mut bars {
            b.volume = 0.0;
        }
        assert!(VolumeRatio::new(3).compute(&bars).iter().all(Option::is_none));
    }
}
