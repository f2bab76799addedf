//! ADX (Average Directional Index) with +DI / -DI.
//!
//! For i >= 1:
//! - +DM = up if up > down and up > 0, else 0   (up = H[i] - H[i-1])
//! - -DM = down if down > up and down > 0, else 0   (down = L[i-1] - L[i])
//! - TR, +DM and -DM are Wilder-averaged over n
//! - +DI = 100 * avg(+DM) / avg(TR), 0 when avg(TR) == 0 (same for -DI)
//! - DX = 100 * |+DI - -DI| / (+DI + -DI), 0 when the sum is 0
//! - ADX = Wilder average of DX over n
//!
//! ±DI are defined from index n, ADX from index 2n-1. Before that the
//! series read 0 (±DI) and 25 (ADX).

use crate::domain::indicator_helpers::wilder_average;
use crate::domain::ohlcv::Candle;

pub const ADX_NEUTRAL: f64 = 25.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AdxSeries {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

pub fn calculate_adx(candles: &[Candle], period: usize) -> AdxSeries {
    let n = candles.len();
    let mut series = AdxSeries {
        adx: vec![ADX_NEUTRAL; n],
        plus_di: vec![0.0; n],
        minus_di: vec![0.0; n],
    };
    if period == 0 || n < period + 1 {
        return series;
    }

    let mut tr = Vec::with_capacity(n - 1);
    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    for i in 1..n {
        let up = candles[i].high - candles[i - 1].high;
        let down = candles[i - 1].low - candles[i].low;
        plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
        tr.push(candles[i].true_range(candles[i - 1].close));
    }

    // Each smoothed vector is indexed by change (i - 1); the first full
    // average sits at change index period - 1, i.e. candle index period.
    let (Some(avg_tr), Some(avg_plus), Some(avg_minus)) = (
        wilder_average(&tr, period),
        wilder_average(&plus_dm, period),
        wilder_average(&minus_dm, period),
    ) else {
        return series;
    };

    let mut dx = Vec::with_capacity(n - period);
    for j in (period - 1)..tr.len() {
        let (pdi, mdi) = if avg_tr[j] > 0.0 {
            (100.0 * avg_plus[j] / avg_tr[j], 100.0 * avg_minus[j] / avg_tr[j])
        } else {
            (0.0, 0.0)
        };
        series.plus_di[j + 1] = pdi;
        series.minus_di[j + 1] = mdi;

        let sum = pdi + mdi;
        dx.push(if sum > 0.0 { 100.0 * (pdi - mdi).abs() / sum } else { 0.0 });
    }

    if let Some(adx) = wilder_average(&dx, period) {
        // dx[k] belongs to candle index period + k
        for (k, value) in adx.into_iter().enumerate().skip(period - 1) {
            series.adx[period + k] = value;
        }
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_candles(data: &[(f64, f64, f64)]) -> Vec<Candle> {
        data.iter()
            .enumerate()
            .map(|(i, &(high, low, close))| Candle {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high,
                low,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn adx_short_series_is_neutral() {
        let candles = make_candles(&[(11.0, 9.0, 10.0); 5]);
        let series = calculate_adx(&candles, 14);
        assert_eq!(series.adx, vec![25.0; 5]);
        assert_eq!(series.plus_di, vec![0.0; 5]);
    }

    #[test]
    fn adx_uptrend_has_dominant_plus_di() {
        let data: Vec<(f64, f64, f64)> = (0..60)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                (base + 1.0, base - 1.0, base)
            })
            .collect();
        let series = calculate_adx(&make_candles(&data), 14);

        assert!(series.plus_di[40] > series.minus_di[40]);
        assert!(series.adx[59] > 50.0, "strong trend ADX {}", series.adx[59]);
        // warm-up stays neutral until 2n-1
        assert_eq!(series.adx[26], 25.0);
        assert_ne!(series.adx[27], 25.0);
    }

    #[test]
    fn adx_flat_series_is_zero_after_warmup() {
        let candles = make_candles(&[(100.0, 100.0, 100.0); 40]);
        let series = calculate_adx(&candles, 14);
        assert_eq!(series.plus_di[20], 0.0);
        assert_eq!(series.minus_di[20], 0.0);
        assert_eq!(series.adx[39], 0.0);
    }

    #[test]
    fn adx_values_stay_bounded() {
        let data: Vec<(f64, f64, f64)> = (0..80)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.4).sin() * 10.0;
                (base + 2.0, base - 2.0, base)
            })
            .collect();
        let series = calculate_adx(&make_candles(&data), 14);
        for i in 0..80 {
            assert!((0.0..=100.0).contains(&series.adx[i]));
            assert!((0.0..=100.0).contains(&series.plus_di[i]));
            assert!((0.0..=100.0).contains(&series.minus_di[i]));
        }
    }
}
