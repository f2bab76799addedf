//! Performance aggregation over a list of closed trades.
//!
//! Every statistic has a defined value for small samples: no trades gives
//! zeros, a loss-free run gives `PROFIT_FACTOR_NO_LOSSES`, and the Sharpe
//! ratio needs at least two trades with non-zero dispersion.

use crate::domain::position::Trade;

const MAX_ANNUALIZATION: usize = 252;

/// Profit factor reported when there are winning trades and no losses.
pub const PROFIT_FACTOR_NO_LOSSES: f64 = 999.0;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    /// Percentage of trades with positive pnl, 0..=100.
    pub win_rate: f64,
    pub profit_factor: f64,
    pub sharpe: f64,
    /// Largest peak-to-trough fall of cumulative pnl_pct, in percentage points.
    pub max_drawdown: f64,
    /// Sum of pnl_pct.
    pub total_return: f64,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub avg_bars_held: f64,
    pub expectancy: f64,
}

impl BacktestResult {
    pub fn from_trades(trades: Vec<Trade>) -> Self {
        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_bars = 0usize;

        for trade in &trades {
            let pnl = trade.pnl_pct;
            if pnl > 0.0 {
                trades_won += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }
            total_bars += trade.bars_held;
        }

        let total = trades.len();
        let win_rate = if total > 0 {
            trades_won as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            PROFIT_FACTOR_NO_LOSSES
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };

        let avg_loss = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        let (avg_bars_held, expectancy) = if total > 0 {
            let n = total as f64;
            let expectancy =
                trades_won as f64 / n * avg_win - trades_lost as f64 / n * avg_loss;
            (total_bars as f64 / n, expectancy)
        } else {
            (0.0, 0.0)
        };

        let pnls: Vec<f64> = trades.iter().map(|t| t.pnl_pct).collect();

        BacktestResult {
            win_rate,
            profit_factor,
            sharpe: compute_sharpe(&pnls),
            max_drawdown: compute_drawdown(&pnls),
            total_return: pnls.iter().sum(),
            trades_won,
            trades_lost,
            trades_breakeven,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            avg_bars_held,
            expectancy,
            trades,
        }
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }
}

fn compute_sharpe(pnls: &[f64]) -> f64 {
    if pnls.len() < 2 {
        return 0.0;
    }

    let n = pnls.len() as f64;
    let mean = pnls.iter().sum::<f64>() / n;
    let variance = pnls.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * (pnls.len().min(MAX_ANNUALIZATION) as f64).sqrt()
    } else {
        0.0
    }
}

fn compute_drawdown(pnls: &[f64]) -> f64 {
    let mut cumulative = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;

    for pnl in pnls {
        cumulative += pnl;
        if cumulative > peak {
            peak = cumulative;
        } else {
            max_dd = max_dd.max(peak - cumulative);
        }
    }

    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::ExitReason;
    use crate::domain::signal::Direction;
    use approx::assert_relative_eq;

    fn trade(pnl_pct: f64, bars_held: usize) -> Trade {
        Trade {
            direction: Direction::Long,
            entry_index: 0,
            exit_index: bars_held,
            entry_price: 100.0,
            exit_price: 100.0 + pnl_pct,
            pnl_pct,
            exit_reason: ExitReason::TakeProfit,
            bars_held,
        }
    }

    #[test]
    fn empty_trade_list() {
        let r = BacktestResult::from_trades(vec![]);
        assert_eq!(r.win_rate, 0.0);
        assert_eq!(r.profit_factor, 0.0);
        assert_eq!(r.sharpe, 0.0);
        assert_eq!(r.max_drawdown, 0.0);
        assert_eq!(r.total_return, 0.0);
        assert_eq!(r.trade_count(), 0);
    }

    #[test]
    fn no_losses_uses_sentinel() {
        let r = BacktestResult::from_trades(vec![trade(2.0, 3), trade(1.0, 5)]);
        assert_eq!(r.profit_factor, PROFIT_FACTOR_NO_LOSSES);
        assert_eq!(r.win_rate, 100.0);
    }

    #[test]
    fn only_losses_has_zero_profit_factor() {
        let r = BacktestResult::from_trades(vec![trade(-2.0, 3)]);
        assert_eq!(r.profit_factor, 0.0);
        assert_eq!(r.largest_loss, 2.0);
    }

    #[test]
    fn mixed_trades() {
        let r = BacktestResult::from_trades(vec![
            trade(4.0, 2),
            trade(-2.0, 4),
            trade(0.0, 6),
            trade(2.0, 4),
        ]);
        assert_eq!(r.trades_won, 2);
        assert_eq!(r.trades_lost, 1);
        assert_eq!(r.trades_breakeven, 1);
        assert_relative_eq!(r.win_rate, 50.0);
        assert_relative_eq!(r.profit_factor, 3.0);
        assert_relative_eq!(r.total_return, 4.0);
        assert_relative_eq!(r.avg_win, 3.0);
        assert_relative_eq!(r.avg_loss, 2.0);
        assert_relative_eq!(r.largest_win, 4.0);
        assert_relative_eq!(r.avg_bars_held, 4.0);
        // 0.5 * 3 - 0.25 * 2
        assert_relative_eq!(r.expectancy, 1.0);
    }

    #[test]
    fn single_trade_has_zero_sharpe() {
        let r = BacktestResult::from_trades(vec![trade(5.0, 1)]);
        assert_eq!(r.sharpe, 0.0);
    }

    #[test]
    fn identical_trades_have_zero_sharpe() {
        let r = BacktestResult::from_trades(vec![trade(1.0, 1); 4]);
        assert_eq!(r.sharpe, 0.0);
    }

    #[test]
    fn sharpe_known_value() {
        // mean 2, sample stdev 2, n = 3: 1 * sqrt(3)
        let r = BacktestResult::from_trades(vec![trade(0.0, 1), trade(2.0, 1), trade(4.0, 1)]);
        assert_relative_eq!(r.sharpe, 3.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn drawdown_walks_cumulative_curve() {
        // cumulative: 3, 1, 4, -1, 2  -> peak 4, trough -1
        let r = BacktestResult::from_trades(vec![
            trade(3.0, 1),
            trade(-2.0, 1),
            trade(3.0, 1),
            trade(-5.0, 1),
            trade(3.0, 1),
        ]);
        assert_relative_eq!(r.max_drawdown, 5.0);
    }

    #[test]
    fn drawdown_from_zero_start() {
        let r = BacktestResult::from_trades(vec![trade(-1.5, 1), trade(-1.0, 1)]);
        assert_relative_eq!(r.max_drawdown, 2.5);
    }
}
