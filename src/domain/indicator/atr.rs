//! ATR (Average True Range), Wilder-smoothed.
//!
//! TR[0] = high - low; TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! Seed is the mean of the first n true ranges at index n-1, earlier indices
//! carry the seed. With fewer than n candles every index holds the mean of
//! the true ranges that do exist (0 for an empty series).

use crate::domain::indicator_helpers::{mean, true_ranges, wilder_average};
use crate::domain::ohlcv::Candle;

pub fn calculate_atr(candles: &[Candle], period: usize) -> Vec<f64> {
    let tr = true_ranges(candles);
    wilder_average(&tr, period).unwrap_or_else(|| vec![mean(&tr); tr.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_candle(day: u32, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn atr_seed_is_average() {
        let candles = vec![
            make_candle(1, 110.0, 100.0, 105.0),
            make_candle(2, 115.0, 105.0, 110.0),
            make_candle(3, 120.0, 110.0, 115.0),
        ];

        let series = calculate_atr(&candles, 3);
        assert_eq!(series.len(), 3);
        assert!((series[2] - 10.0).abs() < 1e-9);
        assert!((series[0] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn atr_wilder_smoothing() {
        let candles = vec![
            make_candle(1, 110.0, 100.0, 105.0),
            make_candle(2, 115.0, 105.0, 110.0),
            make_candle(3, 120.0, 110.0, 115.0),
            make_candle(4, 135.0, 115.0, 130.0),
        ];

        let series = calculate_atr(&candles, 3);
        // TR[3] = max(20, |135-115|, |115-115|) = 20
        let expected = (10.0 * 2.0 + 20.0) / 3.0;
        assert!((series[3] - expected).abs() < 1e-9);
    }

    #[test]
    fn atr_insufficient_candles_uses_mean_true_range() {
        let candles = vec![
            make_candle(1, 110.0, 90.0, 100.0),
            make_candle(2, 105.0, 95.0, 100.0),
        ];
        let series = calculate_atr(&candles, 5);
        assert_eq!(series, vec![15.0, 15.0]);
    }

    #[test]
    fn atr_constant_prices_is_zero() {
        let candles: Vec<Candle> = (1..=20).map(|d| make_candle(d, 50.0, 50.0, 50.0)).collect();
        for v in calculate_atr(&candles, 14) {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn atr_empty() {
        assert!(calculate_atr(&[], 14).is_empty());
    }
}
