//! Rolling population standard deviation.
//!
//! STDDEV(n)[i] = sqrt(sum((P[i-j] - SMA(n)[i])^2 for j in 0..n) / n)
//! Warm-up indices carry the first full window; a short series is 0.

pub fn population_stddev(window: &[f64]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let mean = window.iter().sum::<f64>() / window.len() as f64;
    let variance = window
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / window.len() as f64;
    variance.sqrt()
}

pub fn calculate_stddev(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return vec![0.0; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    for i in (period - 1)..values.len() {
        let value = population_stddev(&values[i + 1 - period..=i]);
        if i == period - 1 {
            out.resize(period, value);
        } else {
            out.push(value);
        }
    }
    out
}
