//! Strategy signal functions and their registry.
//!
//! A strategy reads an `IndicatorSet` at one bar index and returns a
//! `Signal`. Strategies are stateless: the same set and index always give the
//! same signal, and nothing is mutated. Every strategy returns `Flat` until
//! the indicators it lists in `required()` are past their warm-up.
//!
//! Thresholds live in per-strategy parameter structs read from
//! `[strategy.<id>]` config sections.

pub mod cci_williams;
pub mod macd_momentum;
pub mod oversold_reversal;
pub mod stochastic_cross;
pub mod trend_pullback;
pub mod volume_breakout;

use std::fmt;
use std::str::FromStr;

use crate::domain::error::SignalgradeError;
use crate::domain::indicator::{IndicatorKind, IndicatorSet};
use crate::domain::signal::Signal;
use crate::ports::config_port::ConfigPort;

pub use cci_williams::{CciWilliams, CciWilliamsParams};
pub use macd_momentum::{MacdMomentum, MacdMomentumParams};
pub use oversold_reversal::{OversoldReversal, OversoldReversalParams};
pub use stochastic_cross::{StochasticCross, StochasticCrossParams};
pub use trend_pullback::{TrendPullback, TrendPullbackParams};
pub use volume_breakout::{VolumeBreakout, VolumeBreakoutParams};

pub trait Strategy: Send + Sync {
    fn id(&self) -> StrategyId;
    fn name(&self) -> &str;
    /// Indicators that must be past warm-up before the strategy can fire.
    fn required(&self) -> &[IndicatorKind];
    fn evaluate(&self, indicators: &IndicatorSet, index: usize) -> Signal;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StrategyId {
    OversoldReversal,
    TrendPullback,
    MacdMomentum,
    StochasticCross,
    CciWilliams,
    VolumeBreakout,
}

impl StrategyId {
    pub const ALL: [StrategyId; 6] = [
        StrategyId::OversoldReversal,
        StrategyId::TrendPullback,
        StrategyId::MacdMomentum,
        StrategyId::StochasticCross,
        StrategyId::CciWilliams,
        StrategyId::VolumeBreakout,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyId::OversoldReversal => "oversold_reversal",
            StrategyId::TrendPullback => "trend_pullback",
            StrategyId::MacdMomentum => "macd_momentum",
            StrategyId::StochasticCross => "stochastic_cross",
            StrategyId::CciWilliams => "cci_williams",
            StrategyId::VolumeBreakout => "volume_breakout",
        }
    }

    /// Config section holding this strategy's parameters.
    pub fn section(self) -> String {
        format!("strategy.{}", self.as_str())
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = SignalgradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        StrategyId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| SignalgradeError::UnknownStrategy {
                name: s.to_string(),
            })
    }
}

/// Ordered collection of strategies, resolved by `StrategyId`.
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn Strategy>>,
}

impl StrategyRegistry {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Every built-in strategy with default parameters.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Box::new(OversoldReversal::new(OversoldReversalParams::default())),
            Box::new(TrendPullback::new(TrendPullbackParams::default())),
            Box::new(MacdMomentum::new(MacdMomentumParams::default())),
            Box::new(StochasticCross::new(StochasticCrossParams::default())),
            Box::new(CciWilliams::new(CciWilliamsParams::default())),
            Box::new(VolumeBreakout::new(VolumeBreakoutParams::default())),
        ])
    }

    /// Every built-in strategy with parameters from `[strategy.<id>]`.
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        Self::new(vec![
            Box::new(OversoldReversal::new(OversoldReversalParams::from_config(config))),
            Box::new(TrendPullback::new(TrendPullbackParams::from_config(config))),
            Box::new(MacdMomentum::new(MacdMomentumParams::from_config(config))),
            Box::new(StochasticCross::new(StochasticCrossParams::from_config(config))),
            Box::new(CciWilliams::new(CciWilliamsParams::from_config(config))),
            Box::new(VolumeBreakout::new(VolumeBreakoutParams::from_config(config))),
        ])
    }

    /// Keeps only the listed strategies, in registry order.
    pub fn retain(mut self, ids: &[StrategyId]) -> Self {
        self.strategies.retain(|s| ids.contains(&s.id()));
        self
    }

    pub fn get(&self, id: StrategyId) -> Option<&dyn Strategy> {
        self.strategies
            .iter()
            .find(|s| s.id() == id)
            .map(|s| s.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Strategy> {
        self.strategies.iter().map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn evaluate_all(&self, indicators: &IndicatorSet, index: usize) -> Vec<(StrategyId, Signal)> {
        self.iter()
            .map(|s| (s.id(), s.evaluate(indicators, index)))
            .collect()
    }
}

/// True when `left` moved from at-or-below `right` to strictly above it at `index`.
pub(crate) fn crossed_above(
    indicators: &IndicatorSet,
    left: IndicatorKind,
    right: IndicatorKind,
    index: usize,
) -> bool {
    if index == 0 {
        return false;
    }
    let curr = indicators.value(left, index) > indicators.value(right, index);
    let prev = indicators.value(left, index - 1) <= indicators.value(right, index - 1);
    curr && prev
}

/// True when `left` moved from at-or-above `right` to strictly below it at `index`.
pub(crate) fn crossed_below(
    indicators: &IndicatorSet,
    left: IndicatorKind,
    right: IndicatorKind,
    index: usize,
) -> bool {
    if index == 0 {
        return false;
    }
    let curr = indicators.value(left, index) < indicators.value(right, index);
    let prev = indicators.value(left, index - 1) >= indicators.value(right, index - 1);
    curr && prev
}

/// Fraction of `span` covered by `distance`, clamped to [0, 1].
pub(crate) fn strength(distance: f64, span: f64) -> f64 {
    if span > 0.0 {
        (distance / span).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
