//! Walk-forward validation.
//!
//! The candle range is split into a train segment and a later test segment,
//! optionally separated by a purge gap. Each segment is simulated
//! independently from a FLAT state, and the ratio of test to train return
//! measures how much of the in-sample result survives out of sample.

use std::ops::Range;

use rayon::prelude::*;
use tracing::info;

use crate::domain::error::SignalgradeError;
use crate::domain::execution::{simulate, SimulatorConfig};
use crate::domain::indicator::IndicatorSet;
use crate::domain::metrics::BacktestResult;
use crate::domain::strategy::{Strategy, StrategyId, StrategyRegistry};
use crate::ports::config_port::ConfigPort;

const SECTION: &str = "walk_forward";

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WalkForwardConfig {
    /// Fraction of the series assigned to the train segment, in (0, 1).
    pub train_ratio: f64,
    /// Bars skipped between the end of train and the start of test.
    pub purge_bars: usize,
    /// Leading bars excluded from the train segment while indicators warm up.
    pub warmup: usize,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        WalkForwardConfig {
            train_ratio: 0.7,
            purge_bars: 0,
            warmup: 200,
        }
    }
}

impl WalkForwardConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let d = Self::default();
        WalkForwardConfig {
            train_ratio: config.get_double(SECTION, "train_ratio", d.train_ratio),
            purge_bars: config.get_int(SECTION, "purge_bars", d.purge_bars as i64).max(0) as usize,
            warmup: config.get_int(SECTION, "warmup", d.warmup as i64).max(0) as usize,
        }
    }

    pub fn validate(&self) -> Result<(), SignalgradeError> {
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return Err(SignalgradeError::invalid(
                SECTION,
                "train_ratio",
                "must be between 0 and 1 (exclusive)",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WalkForwardSplit {
    pub train: Range<usize>,
    pub test: Range<usize>,
}

/// Splits `n` bars into train and test ranges.
///
/// `train.end + purge_bars <= test.start` always holds and the ranges never
/// overlap. Either range may be empty for short series.
pub fn split(n: usize, config: &WalkForwardConfig) -> WalkForwardSplit {
    let ratio = if config.train_ratio.is_finite() {
        config.train_ratio.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let train_end = ((n as f64 * ratio).floor() as usize).min(n);
    let train_start = config.warmup.min(train_end);
    let test_start = train_end + config.purge_bars;
    WalkForwardSplit {
        train: train_start..train_end,
        test: test_start..n.max(test_start),
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WalkForwardReport {
    pub strategy: StrategyId,
    pub split: WalkForwardSplit,
    pub train: BacktestResult,
    pub test: BacktestResult,
    /// test.total_return / train.total_return; 0 when train return is 0.
    pub overfit_ratio: f64,
}

pub fn overfit_ratio(train_return: f64, test_return: f64) -> f64 {
    if train_return == 0.0 {
        0.0
    } else {
        test_return / train_return
    }
}

/// Simulates `strategy` on the train and test segments of `indicators`.
pub fn run_walk_forward(
    strategy: &dyn Strategy,
    indicators: &IndicatorSet,
    sim: &SimulatorConfig,
    wf: &WalkForwardConfig,
) -> WalkForwardReport {
    let split = split(indicators.len(), wf);
    let (train_trades, test_trades) = rayon::join(
        || simulate(strategy, indicators, split.train.clone(), sim),
        || simulate(strategy, indicators, split.test.clone(), sim),
    );
    let train = BacktestResult::from_trades(train_trades);
    let test = BacktestResult::from_trades(test_trades);
    let overfit_ratio = overfit_ratio(train.total_return, test.total_return);

    info!(
        strategy = %strategy.id(),
        train_trades = train.trade_count(),
        test_trades = test.trade_count(),
        train_return = train.total_return,
        test_return = test.total_return,
        "walk-forward complete"
    );

    WalkForwardReport {
        strategy: strategy.id(),
        split,
        train,
        test,
        overfit_ratio,
    }
}

/// Runs every strategy in the registry in parallel. Output follows registry order.
pub fn run_registry(
    registry: &StrategyRegistry,
    indicators: &IndicatorSet,
    sim: &SimulatorConfig,
    wf: &WalkForwardConfig,
) -> Vec<WalkForwardReport> {
    let strategies: Vec<&dyn Strategy> = registry.iter().collect();
    strategies
        .par_iter()
        .map(|strategy| run_walk_forward(*strategy, indicators, sim, wf))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::IndicatorKind;
    use crate::domain::strategy::test_support::series_set;

    fn wf(train_ratio: f64, purge_bars: usize, warmup: usize) -> WalkForwardConfig {
        WalkForwardConfig {
            train_ratio,
            purge_bars,
            warmup,
        }
    }

    #[test]
    fn split_default_shape() {
        let s = split(1000, &wf(0.7, 10, 200));
        assert_eq!(s.train, 200..700);
        assert_eq!(s.test, 710..1000);
    }

    #[test]
    fn split_short_series() {
        let s = split(10, &wf(0.7, 5, 200));
        assert_eq!(s.train, 7..7);
        assert!(s.test.is_empty());
        assert!(s.train.end + 5 <= s.test.start);
    }

    #[test]
    fn split_empty_series() {
        let s = split(0, &wf(0.7, 0, 0));
        assert!(s.train.is_empty());
        assert!(s.test.is_empty());
    }

    #[test]
    fn overfit_ratio_zero_train() {
        assert_eq!(overfit_ratio(0.0, 12.0), 0.0);
        assert_eq!(overfit_ratio(10.0, 5.0), 0.5);
        assert_eq!(overfit_ratio(-4.0, 2.0), -0.5);
    }

    #[test]
    fn config_validation() {
        assert!(WalkForwardConfig::default().validate().is_ok());
        assert!(wf(1.0, 0, 0).validate().is_err());
        assert!(wf(0.0, 0, 0).validate().is_err());
    }

    #[test]
    fn run_registry_preserves_order() {
        let set = series_set(vec![
            (IndicatorKind::Close, vec![100.0; 50]),
            (IndicatorKind::Atr, vec![1.0; 50]),
        ]);
        let registry = StrategyRegistry::with_defaults();
        let reports = run_registry(
            &registry,
            &set,
            &SimulatorConfig::default(),
            &wf(0.7, 2, 5),
        );
        let ids: Vec<StrategyId> = reports.iter().map(|r| r.strategy).collect();
        assert_eq!(ids, StrategyId::ALL.to_vec());
        for report in &reports {
            assert_eq!(report.train.trade_count(), 0);
            assert_eq!(report.overfit_ratio, 0.0);
            assert_eq!(report.split.train, 5..35);
            assert_eq!(report.split.test, 37..50);
        }
    }
}
