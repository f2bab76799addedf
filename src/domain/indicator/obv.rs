//! OBV (On-Balance Volume).

use crate::domain::ohlcv::Candle;

/// OBV[0] = volume[0]
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// If close[i] == close[i-1]: OBV[i] = OBV[i-1]
///
/// No warm-up; every index is defined.
pub fn calculate_obv(candles: &[Candle]) -> Vec<f64> {
    let mut values = Vec::with_capacity(candles.len());
    let mut obv = 0.0;
    let mut prev_close = 0.0;

    for (i, candle) in candles.iter().enumerate() {
        if i == 0 {
            obv = candle.volume;
        } else if candle.close > prev_close {
            obv += candle.volume;
        } else if candle.close < prev_close {
            obv -= candle.volume;
        }
        prev_close = candle.close;
        values.push(obv);
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_candle(day: u32, close: f64, volume: f64) -> Candle {
        Candle {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    #[test]
    fn obv_first_candle_is_volume() {
        let series = calculate_obv(&[make_candle(1, 100.0, 1000.0)]);
        assert_eq!(series, vec![1000.0]);
    }

    #[test]
    fn obv_accumulates_by_direction() {
        let candles = vec![
            make_candle(1, 100.0, 1000.0),
            make_candle(2, 105.0, 500.0),
            make_candle(3, 103.0, 200.0),
            make_candle(4, 103.0, 900.0),
        ];
        assert_eq!(calculate_obv(&candles), vec![1000.0, 1500.0, 1300.0, 1300.0]);
    }

    #[test]
    fn obv_empty() {
        assert!(calculate_obv(&[]).is_empty());
    }
}
