//! Volume-Weighted Moving Average.
//!
//! VWMA(n)[i] = sum(C * V) / sum(V) over the trailing n candles.
//! A window with zero total volume falls back to the plain mean close.
//! Warm-up indices carry the first full value; a series shorter than n
//! carries its last close.

use crate::domain::indicator_helpers::fill_with_last;
use crate::domain::ohlcv::{closes, Candle};

pub fn calculate_vwma(candles: &[Candle], period: usize) -> Vec<f64> {
    if period == 0 || candles.len() < period {
        return fill_with_last(&closes(candles), candles.len(), 0.0);
    }

    let mut out = Vec::with_capacity(candles.len());
    for i in (period - 1)..candles.len() {
        let window = &candles[i + 1 - period..=i];
        let volume: f64 = window.iter().map(|c| c.volume).sum();
        let value = if volume > 0.0 {
            window.iter().map(|c| c.close * c.volume).sum::<f64>() / volume
        } else {
            window.iter().map(|c| c.close).sum::<f64>() / period as f64
        };

        if i == period - 1 {
            out.resize(period, value);
        } else {
            out.push(value);
        }
    }

    out
}
