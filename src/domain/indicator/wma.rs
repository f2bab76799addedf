//! Weighted and Hull moving averages.
//!
//! O(n) sliding window WMA:
//! WMA(n) = (1*P[i-n+1] + 2*P[i-n+2] + ... + n*P[i]) / (n*(n+1)/2)
//! HMA(n) = WMA(2*WMA(n/2) - WMA(n), floor(sqrt(n)))
//! Indices before the first full window carry the first full value; a series
//! shorter than n carries its last value.

use crate::domain::indicator_helpers::fill_with_last;

pub fn calculate_wma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return fill_with_last(values, values.len(), 0.0);
    }

    let mut out = Vec::with_capacity(values.len());
    let divisor = (period * (period + 1)) as f64 / 2.0;
    let mut weighted_sum: f64 = 0.0;
    let mut window_sum: f64 = 0.0;

    for (i, &v) in values.iter().enumerate() {
        if i < period {
            weighted_sum += (i + 1) as f64 * v;
            window_sum += v;
        } else {
            weighted_sum += period as f64 * v - window_sum;
            window_sum += v - values[i - period];
        }

        if i == period - 1 {
            out.resize(period, weighted_sum / divisor);
        } else if i >= period {
            out.push(weighted_sum / divisor);
        }
    }

    out
}

/// Lag from the first input to the first fully-formed HMA value.
pub fn hma_warmup(period: usize) -> usize {
    period.saturating_sub(1) + hma_root(period).saturating_sub(1)
}

fn hma_root(period: usize) -> usize {
    ((period as f64).sqrt().floor() as usize).max(1)
}

pub fn calculate_hma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return fill_with_last(values, values.len(), 0.0);
    }

    let half = calculate_wma(values, (period / 2).max(1));
    let full = calculate_wma(values, period);
    let raw: Vec<f64> = half
        .iter()
        .zip(full.iter())
        .map(|(h, f)| 2.0 * h - f)
        .collect();

    calculate_wma(&raw, hma_root(period))
}
