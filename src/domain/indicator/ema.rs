//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with the SMA of the first n values at index n-1, then
//! EMA[i] = P[i]*k + EMA[i-1]*(1-k).
//! Indices before n-1 carry the seed. A series shorter than n (or n == 0)
//! carries its last value everywhere.

use crate::domain::indicator_helpers::{fill_with_last, mean};

pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return fill_with_last(values, values.len(), 0.0);
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = mean(&values[..period]);
    let mut out = vec![seed; period];
    let mut ema = seed;

    for &v in &values[period..] {
        ema = v * k + ema * (1.0 - k);
        out.push(ema);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_warmup_carries_seed() {
        let series = calculate_ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert_eq!(series.len(), 5);
        assert!((series[0] - 20.0).abs() < f64::EPSILON);
        assert!((series[1] - 20.0).abs() < f64::EPSILON);
        assert!((series[2] - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_period_1_tracks_input() {
        let series = calculate_ema(&[10.0, 20.0, 30.0], 1);
        assert_eq!(series, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn ema_recursive_calculation() {
        let series = calculate_ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);

        let k = 2.0 / 4.0;
        let sma = (10.0 + 20.0 + 30.0) / 3.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert!((series[3] - ema_3).abs() < f64::EPSILON);
        assert!((series[4] - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_equal_prices() {
        let series = calculate_ema(&[100.0; 5], 3);
        for v in series {
            assert!((v - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_short_series_uses_last_value() {
        let series = calculate_ema(&[10.0, 20.0, 30.0], 5);
        assert_eq!(series, vec![30.0, 30.0, 30.0]);
    }

    #[test]
    fn ema_empty_values() {
        assert!(calculate_ema(&[], 3).is_empty());
    }

    #[test]
    fn ema_period_0_uses_last_value() {
        assert_eq!(calculate_ema(&[10.0, 20.0], 0), vec![20.0, 20.0]);
    }
}
