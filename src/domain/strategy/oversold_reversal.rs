//! Oversold / overbought reversal.
//!
//! LONG when RSI < `rsi_threshold` and the close is below the lower
//! Bollinger band; SHORT when RSI > 100 - `rsi_threshold` and the close is
//! above the upper band. Strength is how far RSI sits past the threshold,
//! relative to the threshold itself.

use crate::domain::indicator::{IndicatorKind, IndicatorSet};
use crate::domain::signal::Signal;
use crate::domain::strategy::{strength, Strategy, StrategyId};
use crate::ports::config_port::ConfigPort;

const REQUIRED: [IndicatorKind; 4] = [
    IndicatorKind::Close,
    IndicatorKind::Rsi,
    IndicatorKind::BollingerUpper,
    IndicatorKind::BollingerLower,
];

#[derive(Debug, Clone, PartialEq)]
pub struct OversoldReversalParams {
    pub rsi_threshold: f64,
}

impl Default for OversoldReversalParams {
    fn default() -> Self {
        Self { rsi_threshold: 30.0 }
    }
}

impl OversoldReversalParams {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let section = StrategyId::OversoldReversal.section();
        let d = Self::default();
        Self {
            rsi_threshold: config.get_double(&section, "rsi_threshold", d.rsi_threshold),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OversoldReversal {
    params: OversoldReversalParams,
}

impl OversoldReversal {
    pub fn new(params: OversoldReversalParams) -> Self {
        Self { params }
    }
}

impl Strategy for OversoldReversal {
    fn id(&self) -> StrategyId {
        StrategyId::OversoldReversal
    }

    fn name(&self) -> &str {
        "Oversold Reversal"
    }

    fn required(&self) -> &[IndicatorKind] {
        &REQUIRED
    }

    fn evaluate(&self, indicators: &IndicatorSet, index: usize) -> Signal {
        if !indicators.ready(&REQUIRED, index) {
            return Signal::Flat;
        }
        let close = indicators.value(IndicatorKind::Close, index);
        let rsi = indicators.value(IndicatorKind::Rsi, index);
        let threshold = self.params.rsi_threshold;

        if rsi < threshold && close < indicators.value(IndicatorKind::BollingerLower, index) {
            return Signal::long(strength(threshold - rsi, threshold));
        }
        if rsi > 100.0 - threshold && close > indicators.value(IndicatorKind::BollingerUpper, index)
        {
            return Signal::short(strength(rsi - (100.0 - threshold), threshold));
        }
        Signal::Flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::Direction;
    use crate::domain::strategy::test_support::constant_set;

    fn set(close: f64, rsi: f64) -> IndicatorSet {
        constant_set(
            3,
            &[
                (IndicatorKind::Close, close),
                (IndicatorKind::Rsi, rsi),
                (IndicatorKind::BollingerUpper, 110.0),
                (IndicatorKind::BollingerLower, 90.0),
            ],
        )
    }

    #[test]
    fn long_below_band_with_low_rsi() {
        let strategy = OversoldReversal::new(OversoldReversalParams::default());
        let signal = strategy.evaluate(&set(85.0, 15.0), 2);
        assert_eq!(signal.direction(), Some(Direction::Long));
        assert!((signal.strength() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn short_above_band_with_high_rsi() {
        let strategy = OversoldReversal::new(OversoldReversalParams::default());
        let signal = strategy.evaluate(&set(115.0, 85.0), 2);
        assert_eq!(signal.direction(), Some(Direction::Short));
    }

    #[test]
    fn needs_both_conditions() {
        let strategy = OversoldReversal::new(OversoldReversalParams::default());
        // RSI low but close inside the bands
        assert!(strategy.evaluate(&set(95.0, 15.0), 2).is_flat());
        // below the band but RSI above threshold
        assert!(strategy.evaluate(&set(85.0, 35.0), 2).is_flat());
    }

    #[test]
    fn threshold_is_configurable() {
        let strategy = OversoldReversal::new(OversoldReversalParams { rsi_threshold: 40.0 });
        assert!(!strategy.evaluate(&set(85.0, 35.0), 2).is_flat());
    }

    #[test]
    fn flat_when_not_ready() {
        let strategy = OversoldReversal::new(OversoldReversalParams::default());
        let set = set(85.0, 15.0).with_warmup(IndicatorKind::Rsi, 5);
        assert!(strategy.evaluate(&set, 2).is_flat());
    }
}
