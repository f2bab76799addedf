//! Live evaluation at the most recent bar.

use crate::domain::indicator::{IndicatorSet, IndicatorSnapshot};
use crate::domain::signal::Signal;
use crate::domain::strategy::{StrategyId, StrategyRegistry};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LiveSignal {
    pub strategy: StrategyId,
    pub signal: Signal,
    /// Indicator values the signal was computed from.
    pub snapshot: IndicatorSnapshot,
}

/// Evaluates every registered strategy at the last index of `indicators`.
/// An empty set yields no signals.
pub fn scan_latest(registry: &StrategyRegistry, indicators: &IndicatorSet) -> Vec<LiveSignal> {
    let Some(index) = indicators.len().checked_sub(1) else {
        return Vec::new();
    };
    let Some(snapshot) = indicators.snapshot(index) else {
        return Vec::new();
    };
    registry
        .evaluate_all(indicators, index)
        .into_iter()
        .map(|(strategy, signal)| LiveSignal {
            strategy,
            signal,
            snapshot: snapshot.clone(),
        })
        .collect()
}
