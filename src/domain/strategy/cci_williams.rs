//! CCI extreme confirmed by Williams %R.

use crate::domain::indicator::{IndicatorKind, IndicatorSet};
use crate::domain::signal::Signal;
use crate::domain::strategy::{strength, Strategy, StrategyId};
use crate::ports::config_port::ConfigPort;

const REQUIRED: [IndicatorKind; 2] = [IndicatorKind::Cci, IndicatorKind::WilliamsR];

#[derive(Debug, Clone, PartialEq)]
pub struct CciWilliamsParams {
    pub cci_threshold: f64,
    pub williams_oversold: f64,
    pub williams_overbought: f64,
}

impl Default for CciWilliamsParams {
    fn default() -> Self {
        Self {
            cci_threshold: 100.0,
            williams_oversold: -80.0,
            williams_overbought: -20.0,
        }
    }
}

impl CciWilliamsParams {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let section = StrategyId::CciWilliams.section();
        let d = Self::default();
        Self {
            cci_threshold: config.get_double(&section, "cci_threshold", d.cci_threshold),
            williams_oversold: config.get_double(&section, "williams_oversold", d.williams_oversold),
            williams_overbought: config.get_double(
                &section,
                "williams_overbought",
                d.williams_overbought,
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CciWilliams {
    params: CciWilliamsParams,
}

impl CciWilliams {
    pub fn new(params: CciWilliamsParams) -> Self {
        Self { params }
    }
}

impl Strategy for CciWilliams {
    fn id(&self) -> StrategyId {
        StrategyId::CciWilliams
    }

    fn name(&self) -> &str {
        "CCI / Williams %R"
    }

    fn required(&self) -> &[IndicatorKind] {
        &REQUIRED
    }

    fn evaluate(&self, indicators: &IndicatorSet, index: usize) -> Signal {
        if !indicators.ready(&REQUIRED, index) {
            return Signal::Flat;
        }
        let cci = indicators.value(IndicatorKind::Cci, index);
        let wr = indicators.value(IndicatorKind::WilliamsR, index);
        let threshold = self.params.cci_threshold;

        if cci < -threshold && wr < self.params.williams_oversold {
            return Signal::long(strength(-cci - threshold, threshold));
        }
        if cci > threshold && wr > self.params.williams_overbought {
            return Signal::short(strength(cci - threshold, threshold));
        }
        Signal::Flat
    }
}
