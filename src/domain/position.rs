//! Open position and closed trade records.

use crate::domain::signal::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExitReason {
    TakeProfit,
    TrailingStop,
    StopLoss,
    TimeExpiry,
    EndOfData,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::TakeProfit => "TAKE_PROFIT",
            ExitReason::TrailingStop => "TRAILING_STOP",
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TimeExpiry => "TIME_EXPIRY",
            ExitReason::EndOfData => "END_OF_DATA",
        }
    }
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single open position. Levels are fixed at entry from the ATR captured
/// then; only `trailing_sl_price` moves, and only in the favorable direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub direction: Direction,
    pub entry_index: usize,
    pub entry_price: f64,
    pub atr_at_entry: f64,
    pub tp_price: f64,
    pub sl_price: f64,
    pub trailing_sl_price: f64,
    pub bars_held: usize,
}

impl Position {
    /// tp = E ± A·T, sl = E ∓ A·S, trailing stop starts at sl.
    pub fn open(
        direction: Direction,
        entry_index: usize,
        entry_price: f64,
        atr: f64,
        tp_multiplier: f64,
        sl_multiplier: f64,
    ) -> Self {
        let sign = direction.sign();
        let sl_price = entry_price - sign * atr * sl_multiplier;
        Self {
            direction,
            entry_index,
            entry_price,
            atr_at_entry: atr,
            tp_price: entry_price + sign * atr * tp_multiplier,
            sl_price,
            trailing_sl_price: sl_price,
            bars_held: 0,
        }
    }

    pub fn is_long(&self) -> bool {
        self.direction == Direction::Long
    }

    /// Distance the trailing stop keeps behind the close.
    pub fn trail_distance(&self, sl_multiplier: f64) -> f64 {
        self.atr_at_entry * sl_multiplier
    }

    /// Moves the trailing stop to `close ∓ distance` when that is strictly
    /// more favorable. Returns true when the stop moved.
    pub fn ratchet(&mut self, close: f64, distance: f64) -> bool {
        let candidate = close - self.direction.sign() * distance;
        let tighter = if self.is_long() {
            candidate > self.trailing_sl_price
        } else {
            candidate < self.trailing_sl_price
        };
        if tighter {
            self.trailing_sl_price = candidate;
        }
        tighter
    }

    /// True once the trailing stop has moved past the initial stop.
    pub fn is_trailing(&self) -> bool {
        if self.is_long() {
            self.trailing_sl_price > self.sl_price
        } else {
            self.trailing_sl_price < self.sl_price
        }
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        if self.is_long() {
            price >= self.tp_price
        } else {
            price <= self.tp_price
        }
    }

    pub fn should_trail_out(&self, price: f64) -> bool {
        self.is_trailing() && self.breaches(price, self.trailing_sl_price)
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        self.breaches(price, self.sl_price)
    }

    fn breaches(&self, price: f64, level: f64) -> bool {
        if self.is_long() {
            price <= level
        } else {
            price >= level
        }
    }

    /// Signed percentage return if closed at `price`.
    pub fn pnl_pct(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price * 100.0 * self.direction.sign()
    }

    pub fn close(self, exit_index: usize, exit_price: f64, exit_reason: ExitReason) -> Trade {
        Trade {
            direction: self.direction,
            entry_index: self.entry_index,
            exit_index,
            entry_price: self.entry_price,
            exit_price,
            pnl_pct: self.pnl_pct(exit_price),
            exit_reason,
            bars_held: self.bars_held,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Trade {
    pub direction: Direction,
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl_pct: f64,
    pub exit_reason: ExitReason,
    pub bars_held: usize,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pnl_pct > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pnl_pct < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn long_levels() {
        let p = Position::open(Direction::Long, 3, 100.0, 2.0, 3.0, 1.5);
        assert_relative_eq!(p.tp_price, 106.0);
        assert_relative_eq!(p.sl_price, 97.0);
        assert_relative_eq!(p.trailing_sl_price, 97.0);
        assert!(!p.is_trailing());
    }

    #[test]
    fn short_levels_mirror_long() {
        let p = Position::open(Direction::Short, 3, 100.0, 2.0, 3.0, 1.5);
        assert_relative_eq!(p.tp_price, 94.0);
        assert_relative_eq!(p.sl_price, 103.0);
    }

    #[test]
    fn ratchet_only_tightens_long() {
        let mut p = Position::open(Direction::Long, 0, 100.0, 2.0, 3.0, 1.5);
        let distance = p.trail_distance(1.5);
        assert!(!p.ratchet(99.0, distance));
        assert_relative_eq!(p.trailing_sl_price, 97.0);
        assert!(p.ratchet(103.0, distance));
        assert_relative_eq!(p.trailing_sl_price, 100.0);
        assert!(!p.ratchet(101.0, distance));
        assert_relative_eq!(p.trailing_sl_price, 100.0);
        assert!(p.is_trailing());
    }

    #[test]
    fn ratchet_only_tightens_short() {
        let mut p = Position::open(Direction::Short, 0, 100.0, 2.0, 3.0, 1.5);
        assert!(p.ratchet(96.0, 3.0));
        assert_relative_eq!(p.trailing_sl_price, 99.0);
        assert!(!p.ratchet(98.0, 3.0));
        assert_relative_eq!(p.trailing_sl_price, 99.0);
    }

    #[test]
    fn trail_out_requires_trailing() {
        let mut p = Position::open(Direction::Long, 0, 100.0, 2.0, 3.0, 1.5);
        assert!(!p.should_trail_out(96.0));
        assert!(p.should_stop_loss(96.0));
        p.ratchet(104.0, 3.0);
        assert!(p.should_trail_out(101.0));
        assert!(!p.should_stop_loss(101.0));
    }

    #[test]
    fn pnl_sign_follows_direction() {
        let long = Position::open(Direction::Long, 0, 100.0, 1.0, 1.0, 1.0);
        let short = Position::open(Direction::Short, 0, 100.0, 1.0, 1.0, 1.0);
        assert_relative_eq!(long.pnl_pct(110.0), 10.0, epsilon = 1e-9);
        assert_relative_eq!(short.pnl_pct(110.0), -10.0, epsilon = 1e-9);
    }

    #[test]
    fn close_produces_trade() {
        let mut p = Position::open(Direction::Long, 2, 50.0, 1.0, 2.0, 1.0);
        p.bars_held = 4;
        let trade = p.close(6, 52.0, ExitReason::TakeProfit);
        assert_eq!(trade.entry_index, 2);
        assert_eq!(trade.exit_index, 6);
        assert_eq!(trade.bars_held, 4);
        assert_relative_eq!(trade.pnl_pct, 4.0, epsilon = 1e-9);
        assert!(trade.is_win());
    }
}
