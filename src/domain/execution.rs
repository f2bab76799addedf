//! Walk-forward trade simulator.
//!
//! Replays one strategy over an index range with at most one open position.
//! Entry happens at the close of the signal bar. Exits are checked on later
//! closes only, in priority order: take-profit, trailing stop, fixed stop,
//! time expiry. A bar that closes a trade does not open a new one, and
//! signals seen while a position is open are ignored.

use std::ops::Range;

use tracing::debug;

use crate::domain::error::SignalgradeError;
use crate::domain::indicator::{IndicatorKind, IndicatorSet};
use crate::domain::position::{ExitReason, Position, Trade};
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;

const SECTION: &str = "simulator";

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SimulatorConfig {
    pub tp_multiplier: f64,
    pub sl_multiplier: f64,
    pub max_hold: usize,
    /// Close a position still open at the end of the range with `EndOfData`.
    /// When false it is discarded.
    pub close_at_end: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            tp_multiplier: 3.0,
            sl_multiplier: 1.5,
            max_hold: 20,
            close_at_end: true,
        }
    }
}

impl SimulatorConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let d = Self::default();
        SimulatorConfig {
            tp_multiplier: config.get_double(SECTION, "tp_multiplier", d.tp_multiplier),
            sl_multiplier: config.get_double(SECTION, "sl_multiplier", d.sl_multiplier),
            max_hold: config.get_int(SECTION, "max_hold", d.max_hold as i64).max(0) as usize,
            close_at_end: config.get_bool(SECTION, "close_at_end", d.close_at_end),
        }
    }

    pub fn validate(&self) -> Result<(), SignalgradeError> {
        if !(self.tp_multiplier.is_finite() && self.tp_multiplier > 0.0) {
            return Err(SignalgradeError::invalid(
                SECTION,
                "tp_multiplier",
                "must be greater than 0",
            ));
        }
        if !(self.sl_multiplier.is_finite() && self.sl_multiplier > 0.0) {
            return Err(SignalgradeError::invalid(
                SECTION,
                "sl_multiplier",
                "must be greater than 0",
            ));
        }
        if self.max_hold == 0 {
            return Err(SignalgradeError::invalid(SECTION, "max_hold", "must be at least 1"));
        }
        Ok(())
    }
}

/// Runs `strategy` over `range` (clamped to the set length), starting FLAT.
pub fn simulate(
    strategy: &dyn Strategy,
    indicators: &IndicatorSet,
    range: Range<usize>,
    config: &SimulatorConfig,
) -> Vec<Trade> {
    let end = range.end.min(indicators.len());
    let start = range.start.min(end);
    let mut trades = Vec::new();
    let mut position: Option<Position> = None;

    for i in start..end {
        let close = indicators.value(IndicatorKind::Close, i);

        if let Some(mut open) = position.take() {
            open.bars_held += 1;
            let distance = open.trail_distance(config.sl_multiplier);
            open.ratchet(close, distance);
            match exit_reason(&open, close, config.max_hold) {
                Some(reason) => {
                    debug!(
                        strategy = %strategy.id(),
                        index = i,
                        reason = %reason,
                        "position closed"
                    );
                    trades.push(open.close(i, close, reason));
                }
                None => position = Some(open),
            }
            continue;
        }

        let Some(direction) = strategy.evaluate(indicators, i).direction() else {
            continue;
        };
        let atr = indicators.value(IndicatorKind::Atr, i);
        if !(close.is_finite() && close > 0.0 && atr.is_finite() && atr > 0.0) {
            debug!(strategy = %strategy.id(), index = i, close, atr, "entry skipped");
            continue;
        }
        position = Some(Position::open(
            direction,
            i,
            close,
            atr,
            config.tp_multiplier,
            config.sl_multiplier,
        ));
    }

    if let Some(open) = position {
        if config.close_at_end && end > 0 {
            let last = end - 1;
            let close = indicators.value(IndicatorKind::Close, last);
            trades.push(open.close(last, close, ExitReason::EndOfData));
        }
    }

    trades
}

fn exit_reason(position: &Position, close: f64, max_hold: usize) -> Option<ExitReason> {
    if position.should_take_profit(close) {
        Some(ExitReason::TakeProfit)
    } else if position.should_trail_out(close) {
        Some(ExitReason::TrailingStop)
    } else if position.should_stop_loss(close) {
        Some(ExitReason::StopLoss)
    } else if position.bars_held >= max_hold {
        Some(ExitReason::TimeExpiry)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::{Direction, Signal};
    use crate::domain::strategy::test_support::series_set;
    use crate::domain::strategy::StrategyId;
    use approx::assert_relative_eq;

    struct Scripted {
        signals: Vec<Signal>,
    }

    impl Scripted {
        fn at(n: usize, index: usize, signal: Signal) -> Self {
            let mut signals = vec![Signal::Flat; n];
            signals[index] = signal;
            Self { signals }
        }
    }

    impl Strategy for Scripted {
        fn id(&self) -> StrategyId {
            StrategyId::OversoldReversal
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn required(&self) -> &[IndicatorKind] {
            &[]
        }

        fn evaluate(&self, _: &IndicatorSet, index: usize) -> Signal {
            self.signals.get(index).copied().unwrap_or(Signal::Flat)
        }
    }

    fn set(closes: &[f64]) -> IndicatorSet {
        series_set(vec![
            (IndicatorKind::Close, closes.to_vec()),
            (IndicatorKind::Atr, vec![2.0; closes.len()]),
        ])
    }

    fn config() -> SimulatorConfig {
        SimulatorConfig {
            tp_multiplier: 3.0,
            sl_multiplier: 1.5,
            max_hold: 20,
            close_at_end: false,
        }
    }

    #[test]
    fn long_take_profit() {
        let closes = [100.0, 101.0, 104.0, 107.0];
        let strategy = Scripted::at(4, 0, Signal::long(1.0));
        let trades = simulate(&strategy, &set(&closes), 0..4, &config());
        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert_eq!(t.exit_reason, ExitReason::TakeProfit);
        assert_eq!((t.entry_index, t.exit_index, t.bars_held), (0, 3, 3));
        assert_relative_eq!(t.pnl_pct, 7.0, epsilon = 1e-9);
    }

    #[test]
    fn long_fixed_stop() {
        let closes = [100.0, 99.0, 96.5];
        let strategy = Scripted::at(3, 0, Signal::long(1.0));
        let trades = simulate(&strategy, &set(&closes), 0..3, &config());
        assert_eq!(trades[0].exit_reason, ExitReason::StopLoss);
        assert!(trades[0].pnl_pct < 0.0);
    }

    #[test]
    fn long_trailing_stop() {
        let closes = [100.0, 104.0, 102.0, 100.5];
        let strategy = Scripted::at(4, 0, Signal::long(1.0));
        let trades = simulate(&strategy, &set(&closes), 0..4, &config());
        assert_eq!(trades[0].exit_reason, ExitReason::TrailingStop);
        assert_eq!(trades[0].exit_index, 3);
        assert_relative_eq!(trades[0].pnl_pct, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn time_expiry() {
        let closes = [100.0, 100.5, 100.2, 100.1];
        let strategy = Scripted::at(4, 0, Signal::long(1.0));
        let cfg = SimulatorConfig {
            max_hold: 2,
            ..config()
        };
        let trades = simulate(&strategy, &set(&closes), 0..4, &cfg);
        assert_eq!(trades[0].exit_reason, ExitReason::TimeExpiry);
        assert_eq!(trades[0].bars_held, 2);
    }

    #[test]
    fn short_take_profit_mirrors_long() {
        let closes = [100.0, 99.0, 95.0, 93.5];
        let strategy = Scripted::at(4, 0, Signal::short(1.0));
        let trades = simulate(&strategy, &set(&closes), 0..4, &config());
        assert_eq!(trades[0].direction, Direction::Short);
        assert_eq!(trades[0].exit_reason, ExitReason::TakeProfit);
        assert_relative_eq!(trades[0].pnl_pct, 6.5, epsilon = 1e-9);
    }

    #[test]
    fn short_fixed_stop() {
        let closes = [100.0, 101.0, 103.5];
        let strategy = Scripted::at(3, 0, Signal::short(1.0));
        let trades = simulate(&strategy, &set(&closes), 0..3, &config());
        assert_eq!(trades[0].exit_reason, ExitReason::StopLoss);
    }

    #[test]
    fn signals_while_open_are_ignored_and_exit_bar_does_not_reenter() {
        let closes = [100.0, 96.0, 100.0, 100.0];
        let strategy = Scripted {
            signals: vec![
                Signal::long(1.0),
                Signal::short(1.0),
                Signal::long(1.0),
                Signal::short(1.0),
            ],
        };
        let trades = simulate(&strategy, &set(&closes), 0..4, &config());
        // entry at 0, stop at 1, no entry on bar 1, re-entry at 2 stays open
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].exit_index, 1);

        let cfg = SimulatorConfig {
            close_at_end: true,
            ..config()
        };
        let trades = simulate(&strategy, &set(&closes), 0..4, &cfg);
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[1].direction, Direction::Long);
        assert_eq!(trades[1].entry_index, 2);
        assert_eq!(trades[1].exit_reason, ExitReason::EndOfData);
        assert_eq!(trades[1].exit_index, 3);
    }

    #[test]
    fn range_bounds_entries_and_is_clamped() {
        let closes = [100.0, 100.0, 100.0, 107.0];
        let strategy = Scripted::at(4, 0, Signal::long(1.0));
        assert!(simulate(&strategy, &set(&closes), 1..10, &config()).is_empty());
        assert!(simulate(&strategy, &set(&closes), 5..2, &config()).is_empty());
    }

    #[test]
    fn non_positive_entry_price_is_skipped() {
        let closes = [0.0, -1.0, 5.0];
        let strategy = Scripted {
            signals: vec![Signal::long(1.0), Signal::long(1.0), Signal::Flat],
        };
        assert!(simulate(&strategy, &set(&closes), 0..3, &config()).is_empty());
    }

    #[test]
    fn config_validation() {
        assert!(SimulatorConfig::default().validate().is_ok());
        let bad = SimulatorConfig {
            max_hold: 0,
            ..SimulatorConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
