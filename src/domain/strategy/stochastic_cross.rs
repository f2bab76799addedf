//! Stochastic %K / %D cross inside the extreme zones.

use crate::domain::indicator::{IndicatorKind, IndicatorSet};
use crate::domain::signal::Signal;
use crate::domain::strategy::{crossed_above, crossed_below, strength, Strategy, StrategyId};
use crate::ports::config_port::ConfigPort;

const REQUIRED: [IndicatorKind; 2] = [IndicatorKind::StochK, IndicatorKind::StochD];

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticCrossParams {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for StochasticCrossParams {
    fn default() -> Self {
        Self {
            oversold: 20.0,
            overbought: 80.0,
        }
    }
}

impl StochasticCrossParams {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let section = StrategyId::StochasticCross.section();
        let d = Self::default();
        Self {
            oversold: config.get_double(&section, "oversold", d.oversold),
            overbought: config.get_double(&section, "overbought", d.overbought),
        }
    }
}

/// LONG when %K crosses above %D with %D below `oversold`; SHORT when %K
/// crosses below %D with %D above `overbought`.
#[derive(Debug, Clone)]
pub struct StochasticCross {
    params: StochasticCrossParams,
}

impl StochasticCross {
    pub fn new(params: StochasticCrossParams) -> Self {
        Self { params }
    }
}

impl Strategy for StochasticCross {
    fn id(&self) -> StrategyId {
        StrategyId::StochasticCross
    }

    fn name(&self) -> &str {
        "Stochastic Cross"
    }

    fn required(&self) -> &[IndicatorKind] {
        &REQUIRED
    }

    fn evaluate(&self, indicators: &IndicatorSet, index: usize) -> Signal {
        if index == 0
            || !indicators.ready(&REQUIRED, index - 1)
            || !indicators.ready(&REQUIRED, index)
        {
            return Signal::Flat;
        }
        let d = indicators.value(IndicatorKind::StochD, index);
        let StochasticCrossParams {
            oversold,
            overbought,
        } = self.params;

        if d < oversold
            && crossed_above(indicators, IndicatorKind::StochK, IndicatorKind::StochD, index)
        {
            return Signal::long(strength(oversold - d, oversold));
        }
        if d > overbought
            && crossed_below(indicators, IndicatorKind::StochK, IndicatorKind::StochD, index)
        {
            return Signal::short(strength(d - overbought, 100.0 - overbought));
        }
        Signal::Flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::Direction;
    use crate::domain::strategy::test_support::series_set;

    fn set(k: [f64; 2], d: [f64; 2]) -> IndicatorSet {
        series_set(vec![
            (IndicatorKind::StochK, k.to_vec()),
            (IndicatorKind::StochD, d.to_vec()),
        ])
    }

    #[test]
    fn long_on_cross_up_in_oversold_zone() {
        let strategy = StochasticCross::new(StochasticCrossParams::default());
        let signal = strategy.evaluate(&set([8.0, 14.0], [12.0, 10.0]), 1);
        assert_eq!(signal.direction(), Some(Direction::Long));
        assert!((signal.strength() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn short_on_cross_down_in_overbought_zone() {
        let strategy = StochasticCross::new(StochasticCrossParams::default());
        let signal = strategy.evaluate(&set([92.0, 85.0], [88.0, 90.0]), 1);
        assert_eq!(signal.direction(), Some(Direction::Short));
    }

    #[test]
    fn cross_outside_zone_is_flat() {
        let strategy = StochasticCross::new(StochasticCrossParams::default());
        assert!(strategy.evaluate(&set([40.0, 55.0], [50.0, 50.0]), 1).is_flat());
    }
}
