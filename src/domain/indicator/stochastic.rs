//! Stochastic oscillator (%K / %D).
//!
//! raw %K = (close - lowest low) / (highest high - lowest low) × 100 over
//! k_period candles, 50 when the range is 0 or before the first full window.
//! %K = SMA(raw %K, smooth_k); %D = SMA(%K, smooth_d).

use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator_helpers::{highest_high, lowest_low};
use crate::domain::ohlcv::Candle;

pub const STOCH_NEUTRAL: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticSeries {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn stochastic_warmup(k_period: usize, smooth_k: usize, smooth_d: usize) -> usize {
    k_period.saturating_sub(1) + smooth_k.saturating_sub(1) + smooth_d.saturating_sub(1)
}

pub fn calculate_stochastic(
    candles: &[Candle],
    k_period: usize,
    smooth_k: usize,
    smooth_d: usize,
) -> StochasticSeries {
    let n = candles.len();
    let mut raw = vec![STOCH_NEUTRAL; n];

    if k_period > 0 {
        for i in (k_period.saturating_sub(1))..n {
            let hh = highest_high(candles, i, k_period);
            let ll = lowest_low(candles, i, k_period);
            let range = hh - ll;
            if range > 0.0 {
                raw[i] = (candles[i].close - ll) / range * 100.0;
            }
        }
    }

    let k = calculate_sma(&raw, smooth_k.max(1));
    let d = calculate_sma(&k, smooth_d.max(1));
    StochasticSeries { k, d }
}
