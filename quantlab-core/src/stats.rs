//! Small numeric helpers shared by indicators, the risk estimator, and the
//! signal engine. All functions are pure and tolerate empty input.

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (N-1 denominator). Returns 0.0 for fewer than 2 values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Population standard deviation (N denominator).
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// One-bar simple returns: `p[i] / p[i-1] - 1`. Length is `prices.len() - 1`.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

/// Quantile with linear interpolation between order statistics.
///
/// `q` in [0, 1]. Position `q * (n - 1)` in the sorted sample; the value is
/// interpolated between the two neighbouring order statistics.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Least-squares fit of `values` against x = 0, 1, 2, …
///
/// Returns `(slope, intercept)`, or `None` for fewer than 2 points.
pub fn linear_regression(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = mean(values);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;
    Some((slope, y_mean - slope * x_mean))
}

/// Largest peak-to-trough decline as a positive fraction.
///
/// The peak must strictly precede the trough. Returns 0.0 for monotonically
/// rising or constant input.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = match values.first() {
        Some(&v) => v,
        None => return 0.0,
    };
    let mut max_dd = 0.0_f64;
    for &v in &values[1..] {
        if peak > 0.0 {
            max_dd = max_dd.max((peak - v) / peak);
        }
        if v > peak {
            peak = v;
        }
    }
    max_dd
}
