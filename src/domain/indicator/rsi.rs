//! RSI (Relative Strength Index).
//!
//! Uses Wilder's smoothing for average gain/loss:
//! - First average: simple mean of the first n gains/losses
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100, unless avg_gain is also 0 (flat prices): 50.
//!
//! Warm-up: the first n indices read 50 (n price changes are needed for the
//! first average). A series with n or fewer values is 50 throughout.

pub const RSI_NEUTRAL: f64 = 50.0;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut values = vec![RSI_NEUTRAL; closes.len()];
    if period == 0 || closes.len() <= period {
        return values;
    }

    let mut gains: Vec<f64> = Vec::with_capacity(closes.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(closes.len() - 1);
    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    values[period] = rsi_from_averages(avg_gain, avg_loss);

    for i in (period + 1)..closes.len() {
        let change_idx = i - 1;
        avg_gain = (avg_gain * (period - 1) as f64 + gains[change_idx]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[change_idx]) / period as f64;
        values[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    values
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { RSI_NEUTRAL } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
