//! Performance summary of a finished (or aborted) run.
//!
//! Ratios follow the guarded conventions:
//! - zero-pnl trades count toward `num_trades` but are neither wins nor losses
//! - `reward_risk_ratio` is `+inf` when there are no losing trades
//! - with no trades at all the statistics section is [`TradeStats::NoTrades`]

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

use super::portfolio::{Portfolio, Trade};
use super::position::Position;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSummary {
    pub num_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakeven: usize,
    pub win_rate_pct: f64,
    /// Mean pnl of winning trades, 0 if none.
    pub avg_win: f64,
    /// Mean pnl of losing trades (negative), 0 if none.
    pub avg_loss: f64,
    /// `|avg_win / avg_loss|`, `+inf` when `avg_loss == 0`. Serialized as
    /// `null` in JSON when infinite.
    pub reward_risk_ratio: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TradeStats {
    NoTrades,
    Executed(TradeSummary),
}

impl TradeStats {
    pub fn from_trades(trades: &[Trade]) -> Self {
        if trades.is_empty() {
            return TradeStats::NoTrades;
        }

        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;

        for trade in trades {
            let pnl = trade.pnl;
            if pnl > 0.0 {
                wins += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                losses += 1;
                total_losses += pnl;
                largest_loss = largest_loss.min(pnl);
            }
        }

        let num_trades = trades.len();
        let avg_win = if wins > 0 {
            total_wins / wins as f64
        } else {
            0.0
        };
        let avg_loss = if losses > 0 {
            total_losses / losses as f64
        } else {
            0.0
        };
        let reward_risk_ratio = if avg_loss != 0.0 {
            (avg_win / avg_loss).abs()
        } else {
            f64::INFINITY
        };

        TradeStats::Executed(TradeSummary {
            num_trades,
            wins,
            losses,
            breakeven: num_trades - wins - losses,
            win_rate_pct: 100.0 * wins as f64 / num_trades as f64,
            avg_win,
            avg_loss,
            reward_risk_ratio,
            largest_win,
            largest_loss,
        })
    }

    pub fn num_trades(&self) -> usize {
        match self {
            TradeStats::NoTrades => 0,
            TradeStats::Executed(s) => s.num_trades,
        }
    }

    pub fn win_rate_pct(&self) -> f64 {
        match self {
            TradeStats::NoTrades => 0.0,
            TradeStats::Executed(s) => s.win_rate_pct,
        }
    }
}

/// A position still open when the bars ran out, marked at the last close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenPositionReport {
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub size: f64,
    pub stop_loss: f64,
    pub mark_time: NaiveDateTime,
    pub mark_price: f64,
    /// What closing at `mark_price` would realize, fees and slippage included.
    pub unrealized_pnl: f64,
}

impl OpenPositionReport {
    pub fn new(
        position: &Position,
        mark_time: NaiveDateTime,
        mark_price: f64,
        unrealized_pnl: f64,
    ) -> Self {
        OpenPositionReport {
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            size: position.size,
            stop_loss: position.stop_loss,
            mark_time,
            mark_price,
            unrealized_pnl,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub initial_balance: f64,
    pub final_balance: f64,
    pub total_return_pct: f64,
    pub realized_pnl: f64,
    pub total_fees: f64,
    pub max_drawdown_pct: f64,
    pub trades: TradeStats,
    pub open_position: Option<OpenPositionReport>,
}

impl Report {
    pub fn generate(portfolio: &Portfolio, open_position: Option<OpenPositionReport>) -> Self {
        let initial = portfolio.initial_balance();
        let total_return_pct = if initial > 0.0 {
            (portfolio.balance() / initial - 1.0) * 100.0
        } else {
            0.0
        };

        Report {
            initial_balance: initial,
            final_balance: portfolio.balance(),
            total_return_pct,
            realized_pnl: portfolio.realized_pnl(),
            total_fees: portfolio.total_fees(),
            max_drawdown_pct: max_drawdown_pct(initial, portfolio.trades()),
            trades: TradeStats::from_trades(portfolio.trades()),
            open_position,
        }
    }
}

/// Largest peak-to-trough drop of the closed-trade balance curve, in percent.
pub fn max_drawdown_pct(initial_balance: f64, trades: &[Trade]) -> f64 {
    let mut balance = initial_balance;
    let mut peak = initial_balance;
    let mut max_dd = 0.0_f64;

    for trade in trades {
        balance += trade.pnl;
        if balance > peak {
            peak = balance;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - balance) / peak);
        }
    }

    max_dd * 100.0
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Backtest Results ===")?;
        writeln!(f, "Initial Balance:  {:.2}", self.initial_balance)?;
        writeln!(f, "Final Balance:    {:.2}", self.final_balance)?;
        writeln!(f, "Total Return:     {:.2}%", self.total_return_pct)?;
        writeln!(f, "Realized P&L:     {:.2}", self.realized_pnl)?;
        writeln!(f, "Fees Paid:        {:.2}", self.total_fees)?;
        writeln!(f, "Max Drawdown:     -{:.2}%", self.max_drawdown_pct)?;

        match &self.trades {
            TradeStats::NoTrades => writeln!(f, "No trades executed")?,
            TradeStats::Executed(s) => {
                writeln!(f, "Total Trades:     {}", s.num_trades)?;
                writeln!(
                    f,
                    "Wins / Losses:    {} / {} ({} breakeven)",
                    s.wins, s.losses, s.breakeven
                )?;
                writeln!(f, "Win Rate:         {:.1}%", s.win_rate_pct)?;
                writeln!(f, "Avg Win:          {:.2}", s.avg_win)?;
                writeln!(f, "Avg Loss:         {:.2}", s.avg_loss)?;
                if s.reward_risk_ratio.is_infinite() {
                    writeln!(f, "Reward/Risk:      inf (no losing trades)")?;
                } else {
                    writeln!(f, "Reward/Risk:      {:.2}", s.reward_risk_ratio)?;
                }
                writeln!(f, "Largest Win:      {:.2}", s.largest_win)?;
                writeln!(f, "Largest Loss:     {:.2}", s.largest_loss)?;
            }
        }

        if let Some(open) = &self.open_position {
            writeln!(f, "\n=== Open Position ===")?;
            writeln!(f, "Entered:          {} @ {:.4}", open.entry_time, open.entry_price)?;
            writeln!(f, "Size:             {:.6}", open.size)?;
            writeln!(f, "Stop Loss:        {:.4}", open.stop_loss)?;
            writeln!(f, "Marked:           {} @ {:.4}", open.mark_time, open.mark_price)?;
            writeln!(f, "Unrealized P&L:   {:.2}", open.unrealized_pnl)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::ExitReason;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn make_trade(pnl: f64) -> Trade {
        Trade {
            entry_time: ts(1),
            exit_time: ts(2),
            entry_price: 100.0,
            exit_price: 100.0 + pnl,
            size: 1.0,
            fees: 0.0,
            pnl,
            exit_reason: ExitReason::Signal,
        }
    }

    fn summary(pnls: &[f64]) -> TradeSummary {
        let trades: Vec<Trade> = pnls.iter().map(|&p| make_trade(p)).collect();
        match TradeStats::from_trades(&trades) {
            TradeStats::Executed(s) => s,
            TradeStats::NoTrades => panic!("expected executed trades"),
        }
    }

    #[test]
    fn no_trades_is_explicit() {
        let stats = TradeStats::from_trades(&[]);
        assert_eq!(stats, TradeStats::NoTrades);
        assert_eq!(stats.num_trades(), 0);
        assert_eq!(stats.win_rate_pct(), 0.0);
    }

    #[test]
    fn wins_and_losses() {
        let s = summary(&[100.0, -50.0, 200.0, 0.0]);
        assert_eq!(s.num_trades, 4);
        assert_eq!(s.wins, 2);
        assert_eq!(s.losses, 1);
        assert_eq!(s.breakeven, 1);
        assert_relative_eq!(s.win_rate_pct, 50.0);
        assert_relative_eq!(s.avg_win, 150.0);
        assert_relative_eq!(s.avg_loss, -50.0);
        assert_relative_eq!(s.reward_risk_ratio, 3.0);
        assert_relative_eq!(s.largest_win, 200.0);
        assert_relative_eq!(s.largest_loss, -50.0);
    }

    #[test]
    fn no_losses_gives_infinite_ratio() {
        let s = summary(&[10.0, 10.0]);
        assert_eq!(s.reward_risk_ratio, f64::INFINITY);
        assert_eq!(s.avg_loss, 0.0);
    }

    #[test]
    fn zero_pnl_trade_is_neither_win_nor_loss() {
        let s = summary(&[0.0]);
        assert_eq!(s.num_trades, 1);
        assert_eq!(s.wins, 0);
        assert_eq!(s.losses, 0);
        assert_eq!(s.win_rate_pct, 0.0);
    }

    #[test]
    fn drawdown_over_balance_curve() {
        // 1000 → 1100 → 990 → 1045
        let trades = [make_trade(100.0), make_trade(-110.0), make_trade(55.0)];
        assert_relative_eq!(max_drawdown_pct(1000.0, &trades), 10.0, epsilon = 1e-9);
        assert_eq!(max_drawdown_pct(1000.0, &[]), 0.0);
    }

    #[test]
    fn report_from_portfolio() {
        use crate::domain::execution::ExecutionCosts;
        use crate::domain::position::Position;

        let mut p = Portfolio::new(1000.0, ExecutionCosts::default());
        let pos = Position {
            entry_price: 100.0,
            entry_time: ts(1),
            size: 2.0,
            stop_loss: 95.0,
            entry_fee: 0.0,
        };
        p.update_after_trade(pos, 110.0, ts(3), ExitReason::Signal);

        let report = Report::generate(&p, None);
        assert_relative_eq!(report.total_return_pct, 2.0, epsilon = 1e-9);
        assert_eq!(report.final_balance, 1020.0);
        assert_eq!(report.trades.num_trades(), 1);
        assert!(report.open_position.is_none());
    }

    #[test]
    fn display_mentions_no_trades() {
        use crate::domain::execution::ExecutionCosts;
        let p = Portfolio::new(500.0, ExecutionCosts::default());
        let text = Report::generate(&p, None).to_string();
        assert!(text.contains("No trades executed"));
        assert!(text.contains("Total Return:     0.00%"));
    }

    #[test]
    fn infinite_ratio_serializes_as_null() {
        let stats = TradeStats::from_trades(&[make_trade(10.0)]);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["status"], "executed");
        assert!(json["reward_risk_ratio"].is_null());
    }
}
