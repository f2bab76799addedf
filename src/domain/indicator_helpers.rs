//! Shared helper functions for indicator calculations.

use crate::domain::ohlcv::Candle;

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// A series of `len` copies of the last value in `values`, or of `default`
/// when `values` is empty.
pub fn fill_with_last(values: &[f64], len: usize, default: f64) -> Vec<f64> {
    vec![values.last().copied().unwrap_or(default); len]
}

/// Wilder smoothing: the first value is the simple mean of the first
/// `period` inputs, then `avg = (avg * (period - 1) + new) / period`.
///
/// The output has the same length as `values`; indices before `period - 1`
/// carry the seed. Returns `None` when there are fewer than `period` inputs.
pub fn wilder_average(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }

    let seed = mean(&values[..period]);
    let mut out = vec![seed; period];
    let mut avg = seed;
    for &v in &values[period..] {
        avg = (avg * (period - 1) as f64 + v) / period as f64;
        out.push(avg);
    }
    Some(out)
}

/// Highest high over the `period` candles ending at `end` (inclusive).
pub fn highest_high(candles: &[Candle], end: usize, period: usize) -> f64 {
    let start = (end + 1).saturating_sub(period);
    candles[start..=end]
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Lowest low over the `period` candles ending at `end` (inclusive).
pub fn lowest_low(candles: &[Candle], end: usize, period: usize) -> f64 {
    let start = (end + 1).saturating_sub(period);
    candles[start..=end]
        .iter()
        .map(|c| c.low)
        .fold(f64::INFINITY, f64::min)
}

/// True range per candle; the first candle has no previous close and uses
/// high - low.
pub fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 {
                c.high - c.low
            } else {
                c.true_range(candles[i - 1].close)
            }
        })
        .collect()
}
