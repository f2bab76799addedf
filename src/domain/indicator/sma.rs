//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(P[i-n+1..=i]). Indices before n-1 carry the first full
//! window's mean; a series shorter than n carries its last value.

use crate::domain::indicator_helpers::{fill_with_last, mean};

pub fn calculate_sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return fill_with_last(values, values.len(), 0.0);
    }

    let seed = mean(&values[..period]);
    let mut out = vec![seed; period];
    let mut window_sum = seed * period as f64;

    for i in period..values.len() {
        window_sum += values[i] - values[i - period];
        out.push(window_sum / period as f64);
    }

    out
}
