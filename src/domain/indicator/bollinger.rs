//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! Warm-up indices carry the first full window's bands. A series shorter than
//! n has all three bands equal to its last close.

use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::stddev::calculate_stddev;
use crate::domain::indicator_helpers::fill_with_last;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, multiplier: f64) -> BollingerSeries {
    if period == 0 || closes.len() < period {
        let flat = fill_with_last(closes, closes.len(), 0.0);
        return BollingerSeries {
            upper: flat.clone(),
            middle: flat.clone(),
            lower: flat,
        };
    }

    let middle = calculate_sma(closes, period);
    let stddev = calculate_stddev(closes, period);

    let upper = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m + multiplier * s)
        .collect();
    let lower = middle
        .iter()
        .zip(&stddev)
        .map(|(m, s)| m - multiplier * s)
        .collect();

    BollingerSeries {
        upper,
        middle,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_constant_prices_collapse() {
        let series = calculate_bollinger(&[100.0; 30], DEFAULT_PERIOD, DEFAULT_MULTIPLIER);
        for i in 0..30 {
            assert_eq!(series.upper[i], series.middle[i]);
            assert_eq!(series.lower[i], series.middle[i]);
            assert!((series.middle[i] - 100.0).abs() < 1e-12);
        }
    }

    #[test]
    fn bollinger_known_values() {
        let closes = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let series = calculate_bollinger(&closes, 8, 2.0);
        assert!((series.middle[7] - 5.0).abs() < 1e-12);
        assert!((series.upper[7] - 9.0).abs() < 1e-12);
        assert!((series.lower[7] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bollinger_bands_are_ordered() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.5).sin() * 3.0).collect();
        let series = calculate_bollinger(&closes, 20, 2.0);
        for i in 0..50 {
            assert!(series.upper[i] >= series.middle[i]);
            assert!(series.middle[i] >= series.lower[i]);
        }
    }

    #[test]
    fn bollinger_short_series_uses_last_close() {
        let series = calculate_bollinger(&[10.0, 11.0], 20, 2.0);
        assert_eq!(series.middle, vec![11.0, 11.0]);
        assert_eq!(series.upper, series.lower);
    }
}
