//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of the MACD Line, seeded from the first index
//! where the slow EMA is fully formed
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warm-up: slow - 1 + signal - 1 indices. A series shorter than the slow
//! period degrades to a flat zero line, signal and histogram.

use crate::domain::indicator::ema::calculate_ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd_warmup(slow: usize, signal: usize) -> usize {
    slow.saturating_sub(1) + signal.saturating_sub(1)
}

pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdSeries {
    let n = closes.len();
    if slow == 0 || n < slow {
        return MacdSeries {
            line: vec![0.0; n],
            signal: vec![0.0; n],
            histogram: vec![0.0; n],
        };
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);
    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    let macd_warmup = slow - 1;
    let tail = calculate_ema(&line[macd_warmup..], signal_period);
    let mut signal = vec![tail[0]; macd_warmup];
    signal.extend(tail);

    let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}
