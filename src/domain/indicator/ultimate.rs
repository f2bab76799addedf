//! Ultimate Oscillator.
//!
//! For i >= 1:
//! - BP = close - min(low, prev close)
//! - TR = max(high, prev close) - min(low, prev close)
//! - avg(n) = sum(BP) / sum(TR) over the last n candles; 0.5 when sum(TR) is 0
//! UO = 100 × (4·avg(short) + 2·avg(mid) + avg(long)) / 7
//!
//! Defined from index `long`; earlier indices and short series read 50.

use crate::domain::ohlcv::Candle;

pub const UO_NEUTRAL: f64 = 50.0;
pub const DEFAULT_PERIODS: (usize, usize, usize) = (7, 14, 28);

pub fn calculate_ultimate(
    candles: &[Candle],
    short: usize,
    mid: usize,
    long: usize,
) -> Vec<f64> {
    let n = candles.len();
    let mut values = vec![UO_NEUTRAL; n];
    let longest = short.max(mid).max(long);
    if short == 0 || mid == 0 || long == 0 || n < longest + 1 {
        return values;
    }

    // index 0 is a placeholder so bp/tr align with candle indices
    let mut bp = vec![0.0; n];
    let mut tr = vec![0.0; n];
    for i in 1..n {
        let prev_close = candles[i - 1].close;
        let true_low = candles[i].low.min(prev_close);
        let true_high = candles[i].high.max(prev_close);
        bp[i] = candles[i].close - true_low;
        tr[i] = true_high - true_low;
    }

    let average = |end: usize, period: usize| -> f64 {
        let start = end + 1 - period;
        let tr_sum: f64 = tr[start..=end].iter().sum();
        if tr_sum > 0.0 {
            bp[start..=end].iter().sum::<f64>() / tr_sum
        } else {
            0.5
        }
    };

    for (i, value) in values.iter_mut().enumerate().skip(longest) {
        let fast = average(i, short);
        let medium = average(i, mid);
        let slow = average(i, long);
        *value = 100.0 * (4.0 * fast + 2.0 * medium + slow) / 7.0;
    }

    values
}
