//! Volume-confirmed band breakout.
//!
//! LONG when the close breaks above the upper Bollinger band, OBV is higher
//! than `obv_lookback` bars ago, the close is above VWMA and the Ultimate
//! Oscillator is above `uo_threshold`. SHORT mirrors it against the lower
//! band with UO below 100 - `uo_threshold`. Strength is the breakout distance
//! measured in half-band widths.

use crate::domain::indicator::{IndicatorKind, IndicatorSet};
use crate::domain::signal::Signal;
use crate::domain::strategy::{strength, Strategy, StrategyId};
use crate::ports::config_port::ConfigPort;

const REQUIRED: [IndicatorKind; 7] = [
    IndicatorKind::Close,
    IndicatorKind::BollingerUpper,
    IndicatorKind::BollingerMiddle,
    IndicatorKind::BollingerLower,
    IndicatorKind::Obv,
    IndicatorKind::Vwma,
    IndicatorKind::Ultimate,
];

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeBreakoutParams {
    pub obv_lookback: usize,
    pub uo_threshold: f64,
}

impl Default for VolumeBreakoutParams {
    fn default() -> Self {
        Self {
            obv_lookback: 5,
            uo_threshold: 50.0,
        }
    }
}

impl VolumeBreakoutParams {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let section = StrategyId::VolumeBreakout.section();
        let d = Self::default();
        Self {
            obv_lookback: config
                .get_int(&section, "obv_lookback", d.obv_lookback as i64)
                .max(1) as usize,
            uo_threshold: config.get_double(&section, "uo_threshold", d.uo_threshold),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VolumeBreakout {
    params: VolumeBreakoutParams,
}

impl VolumeBreakout {
    pub fn new(params: VolumeBreakoutParams) -> Self {
        Self { params }
    }
}

impl Strategy for VolumeBreakout {
    fn id(&self) -> StrategyId {
        StrategyId::VolumeBreakout
    }

    fn name(&self) -> &str {
        "Volume Breakout"
    }

    fn required(&self) -> &[IndicatorKind] {
        &REQUIRED
    }

    fn evaluate(&self, indicators: &IndicatorSet, index: usize) -> Signal {
        let lookback = self.params.obv_lookback.max(1);
        if index < lookback || !indicators.ready(&REQUIRED, index) {
            return Signal::Flat;
        }
        let close = indicators.value(IndicatorKind::Close, index);
        let upper = indicators.value(IndicatorKind::BollingerUpper, index);
        let middle = indicators.value(IndicatorKind::BollingerMiddle, index);
        let lower = indicators.value(IndicatorKind::BollingerLower, index);
        let vwma = indicators.value(IndicatorKind::Vwma, index);
        let uo = indicators.value(IndicatorKind::Ultimate, index);
        let obv_change = indicators.value(IndicatorKind::Obv, index)
            - indicators.value(IndicatorKind::Obv, index - lookback);

        if close > upper && obv_change > 0.0 && close > vwma && uo > self.params.uo_threshold {
            return Signal::long(strength(close - upper, upper - middle));
        }
        if close < lower
            && obv_change < 0.0
            && close < vwma
            && uo < 100.0 - self.params.uo_threshold
        {
            return Signal::short(strength(lower - close, middle - lower));
        }
        Signal::Flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::Direction;
    use crate::domain::strategy::test_support::series_set;

    fn set(close: f64, obv: Vec<f64>, vwma: f64, uo: f64) -> IndicatorSet {
        let n = obv.len();
        series_set(vec![
            (IndicatorKind::Close, vec![close; n]),
            (IndicatorKind::BollingerUpper, vec![104.0; n]),
            (IndicatorKind::BollingerMiddle, vec![100.0; n]),
            (IndicatorKind::BollingerLower, vec![96.0; n]),
            (IndicatorKind::Obv, obv),
            (IndicatorKind::Vwma, vec![vwma; n]),
            (IndicatorKind::Ultimate, vec![uo; n]),
        ])
    }

    fn rising() -> Vec<f64> {
        (0..6).map(|i| 1000.0 + i as f64 * 100.0).collect()
    }

    fn falling() -> Vec<f64> {
        (0..6).map(|i| 1000.0 - i as f64 * 100.0).collect()
    }

    #[test]
    fn long_breakout_with_volume() {
        let strategy = VolumeBreakout::new(VolumeBreakoutParams::default());
        let signal = strategy.evaluate(&set(106.0, rising(), 101.0, 62.0), 5);
        assert_eq!(signal.direction(), Some(Direction::Long));
        assert!((signal.strength() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn short_breakdown_with_volume() {
        let strategy = VolumeBreakout::new(VolumeBreakoutParams::default());
        let signal = strategy.evaluate(&set(93.0, falling(), 99.0, 35.0), 5);
        assert_eq!(signal.direction(), Some(Direction::Short));
    }

    #[test]
    fn breakout_without_volume_is_flat() {
        let strategy = VolumeBreakout::new(VolumeBreakoutParams::default());
        assert!(strategy.evaluate(&set(106.0, falling(), 101.0, 62.0), 5).is_flat());
    }

    #[test]
    fn not_enough_history_for_lookback() {
        let strategy = VolumeBreakout::new(VolumeBreakoutParams::default());
        assert!(strategy.evaluate(&set(106.0, rising(), 101.0, 62.0), 4).is_flat());
    }
}
