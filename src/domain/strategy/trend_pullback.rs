//! Trend pullback.
//!
//! Buys dips inside an established trend: RSI below `pullback_rsi`, ADX above
//! `adx_min`, fast EMA above slow EMA and the close above the long trend EMA.
//! The short side mirrors every condition.

use crate::domain::indicator::{IndicatorKind, IndicatorSet};
use crate::domain::signal::Signal;
use crate::domain::strategy::{strength, Strategy, StrategyId};
use crate::ports::config_port::ConfigPort;

const REQUIRED: [IndicatorKind; 6] = [
    IndicatorKind::Close,
    IndicatorKind::Rsi,
    IndicatorKind::Adx,
    IndicatorKind::EmaFast,
    IndicatorKind::EmaSlow,
    IndicatorKind::EmaTrend,
];

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPullbackParams {
    pub pullback_rsi: f64,
    pub adx_min: f64,
}

impl Default for TrendPullbackParams {
    fn default() -> Self {
        Self {
            pullback_rsi: 45.0,
            adx_min: 20.0,
        }
    }
}

impl TrendPullbackParams {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let section = StrategyId::TrendPullback.section();
        let d = Self::default();
        Self {
            pullback_rsi: config.get_double(&section, "pullback_rsi", d.pullback_rsi),
            adx_min: config.get_double(&section, "adx_min", d.adx_min),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrendPullback {
    params: TrendPullbackParams,
}

impl TrendPullback {
    pub fn new(params: TrendPullbackParams) -> Self {
        Self { params }
    }
}

impl Strategy for TrendPullback {
    fn id(&self) -> StrategyId {
        StrategyId::TrendPullback
    }

    fn name(&self) -> &str {
        "Trend Pullback"
    }

    fn required(&self) -> &[IndicatorKind] {
        &REQUIRED
    }

    fn evaluate(&self, indicators: &IndicatorSet, index: usize) -> Signal {
        if !indicators.ready(&REQUIRED, index) {
            return Signal::Flat;
        }
        let adx = indicators.value(IndicatorKind::Adx, index);
        if adx <= self.params.adx_min {
            return Signal::Flat;
        }

        let close = indicators.value(IndicatorKind::Close, index);
        let rsi = indicators.value(IndicatorKind::Rsi, index);
        let fast = indicators.value(IndicatorKind::EmaFast, index);
        let slow = indicators.value(IndicatorKind::EmaSlow, index);
        let trend = indicators.value(IndicatorKind::EmaTrend, index);
        let pullback = self.params.pullback_rsi;

        if rsi < pullback && fast > slow && close > trend {
            return Signal::long(strength(pullback - rsi, pullback));
        }
        let ceiling = 100.0 - pullback;
        if rsi > ceiling && fast < slow && close < trend {
            return Signal::short(strength(rsi - ceiling, pullback));
        }
        Signal::Flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::Direction;
    use crate::domain::strategy::test_support::constant_set;

    fn set(close: f64, rsi: f64, adx: f64, fast: f64, slow: f64, trend: f64) -> IndicatorSet {
        constant_set(
            2,
            &[
                (IndicatorKind::Close, close),
                (IndicatorKind::Rsi, rsi),
                (IndicatorKind::Adx, adx),
                (IndicatorKind::EmaFast, fast),
                (IndicatorKind::EmaSlow, slow),
                (IndicatorKind::EmaTrend, trend),
            ],
        )
    }

    #[test]
    fn long_on_pullback_in_uptrend() {
        let strategy = TrendPullback::new(TrendPullbackParams::default());
        let signal = strategy.evaluate(&set(105.0, 40.0, 30.0, 104.0, 102.0, 95.0), 1);
        assert_eq!(signal.direction(), Some(Direction::Long));
    }

    #[test]
    fn short_on_rally_in_downtrend() {
        let strategy = TrendPullback::new(TrendPullbackParams::default());
        let signal = strategy.evaluate(&set(90.0, 60.0, 30.0, 91.0, 93.0, 100.0), 1);
        assert_eq!(signal.direction(), Some(Direction::Short));
    }

    #[test]
    fn weak_trend_is_flat() {
        let strategy = TrendPullback::new(TrendPullbackParams::default());
        assert!(strategy
            .evaluate(&set(105.0, 40.0, 15.0, 104.0, 102.0, 95.0), 1)
            .is_flat());
    }

    #[test]
    fn ema_order_must_confirm() {
        let strategy = TrendPullback::new(TrendPullbackParams::default());
        assert!(strategy
            .evaluate(&set(105.0, 40.0, 30.0, 101.0, 102.0, 95.0), 1)
            .is_flat());
    }
}
