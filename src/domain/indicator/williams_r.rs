//! Williams %R.
//!
//! %R = (highest high - close) / (highest high - lowest low) × -100 over n
//! candles. Ranges from -100 (close at the low) to 0 (close at the high).
//! A zero range, warm-up indices and short series read -50.

use crate::domain::indicator_helpers::{highest_high, lowest_low};
use crate::domain::ohlcv::Candle;

pub const WILLIAMS_NEUTRAL: f64 = -50.0;

pub fn calculate_williams_r(candles: &[Candle], period: usize) -> Vec<f64> {
    let mut values = vec![WILLIAMS_NEUTRAL; candles.len()];
    if period == 0 || candles.len() < period {
        return values;
    }

    for i in (period - 1)..candles.len() {
        let hh = highest_high(candles, i, period);
        let ll = lowest_low(candles, i, period);
        let range = hh - ll;
        if range > 0.0 {
            values[i] = (hh - candles[i].close) / range * -100.0;
        }
    }

    values
}
