//! MACD momentum.
//!
//! LONG when the MACD histogram crosses above zero, +DI leads -DI by more
//! than `di_margin` and the close is above the HMA. SHORT mirrors it.

use crate::domain::indicator::{IndicatorKind, IndicatorSet};
use crate::domain::signal::Signal;
use crate::domain::strategy::{strength, Strategy, StrategyId};
use crate::ports::config_port::ConfigPort;

const REQUIRED: [IndicatorKind; 5] = [
    IndicatorKind::Close,
    IndicatorKind::MacdHistogram,
    IndicatorKind::PlusDi,
    IndicatorKind::MinusDi,
    IndicatorKind::Hma,
];

/// DI spread at which strength saturates.
const FULL_DI_SPREAD: f64 = 25.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdMomentumParams {
    pub di_margin: f64,
}

impl Default for MacdMomentumParams {
    fn default() -> Self {
        Self { di_margin: 0.0 }
    }
}

impl MacdMomentumParams {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let section = StrategyId::MacdMomentum.section();
        let d = Self::default();
        Self {
            di_margin: config.get_double(&section, "di_margin", d.di_margin),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MacdMomentum {
    params: MacdMomentumParams,
}

impl MacdMomentum {
    pub fn new(params: MacdMomentumParams) -> Self {
        Self { params }
    }
}

impl Strategy for MacdMomentum {
    fn id(&self) -> StrategyId {
        StrategyId::MacdMomentum
    }

    fn name(&self) -> &str {
        "MACD Momentum"
    }

    fn required(&self) -> &[IndicatorKind] {
        &REQUIRED
    }

    fn evaluate(&self, indicators: &IndicatorSet, index: usize) -> Signal {
        // the cross needs the previous bar as well
        if index == 0
            || !indicators.ready(&REQUIRED, index - 1)
            || !indicators.ready(&REQUIRED, index)
        {
            return Signal::Flat;
        }
        let hist = indicators.value(IndicatorKind::MacdHistogram, index);
        let prev_hist = indicators.value(IndicatorKind::MacdHistogram, index - 1);
        let spread = indicators.value(IndicatorKind::PlusDi, index)
            - indicators.value(IndicatorKind::MinusDi, index);
        let close = indicators.value(IndicatorKind::Close, index);
        let hma = indicators.value(IndicatorKind::Hma, index);

        if prev_hist <= 0.0 && hist > 0.0 && spread > self.params.di_margin && close > hma {
            return Signal::long(strength(spread, FULL_DI_SPREAD));
        }
        if prev_hist >= 0.0 && hist < 0.0 && -spread > self.params.di_margin && close < hma {
            return Signal::short(strength(-spread, FULL_DI_SPREAD));
        }
        Signal::Flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::Direction;
    use crate::domain::strategy::test_support::series_set;

    fn set(hist: [f64; 2], plus: f64, minus: f64, close: f64, hma: f64) -> IndicatorSet {
        series_set(vec![
            (IndicatorKind::Close, vec![close; 2]),
            (IndicatorKind::MacdHistogram, hist.to_vec()),
            (IndicatorKind::PlusDi, vec![plus; 2]),
            (IndicatorKind::MinusDi, vec![minus; 2]),
            (IndicatorKind::Hma, vec![hma; 2]),
        ])
    }

    #[test]
    fn long_on_bullish_cross() {
        let strategy = MacdMomentum::new(MacdMomentumParams::default());
        let signal = strategy.evaluate(&set([-0.2, 0.3], 30.0, 17.5, 101.0, 100.0), 1);
        assert_eq!(signal.direction(), Some(Direction::Long));
        assert!((signal.strength() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn short_on_bearish_cross() {
        let strategy = MacdMomentum::new(MacdMomentumParams::default());
        let signal = strategy.evaluate(&set([0.1, -0.4], 12.0, 28.0, 99.0, 100.0), 1);
        assert_eq!(signal.direction(), Some(Direction::Short));
    }

    #[test]
    fn no_cross_is_flat() {
        let strategy = MacdMomentum::new(MacdMomentumParams::default());
        assert!(strategy
            .evaluate(&set([0.1, 0.3], 30.0, 10.0, 101.0, 100.0), 1)
            .is_flat());
    }

    #[test]
    fn di_must_confirm() {
        let strategy = MacdMomentum::new(MacdMomentumParams::default());
        assert!(strategy
            .evaluate(&set([-0.2, 0.3], 15.0, 20.0, 101.0, 100.0), 1)
            .is_flat());
    }

    #[test]
    fn first_bar_is_flat() {
        let strategy = MacdMomentum::new(MacdMomentumParams::default());
        assert!(strategy
            .evaluate(&set([-0.2, 0.3], 30.0, 10.0, 101.0, 100.0), 0)
            .is_flat());
    }
}
