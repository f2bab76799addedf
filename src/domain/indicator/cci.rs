//! CCI (Commodity Channel Index).
//!
//! CCI = (TP - mean(TP)) / (0.015 × mean absolute deviation of TP), over n
//! candles, TP = (H + L + C) / 3. Zero deviation, warm-up indices and short
//! series all read 0.

use crate::domain::ohlcv::Candle;

const LAMBERT_CONSTANT: f64 = 0.015;

pub fn calculate_cci(candles: &[Candle], period: usize) -> Vec<f64> {
    let mut values = vec![0.0; candles.len()];
    if period == 0 || candles.len() < period {
        return values;
    }

    let typical: Vec<f64> = candles.iter().map(Candle::typical_price).collect();
    for i in (period - 1)..candles.len() {
        let window = &typical[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let mad = window.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period as f64;
        if mad > 0.0 {
            values[i] = (typical[i] - mean) / (LAMBERT_CONSTANT * mad);
        }
    }

    values
}
