//! Portfolio ledger: balance, realized P&L and the append-only trade log.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use super::execution::ExecutionCosts;
use super::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    Signal,
    EndOfData,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::StopLoss => "stop_loss",
            ExitReason::Signal => "signal",
            ExitReason::EndOfData => "end_of_data",
        };
        f.write_str(s)
    }
}

/// A closed round trip. Prices are fills (after slippage), `fees` covers
/// both legs and is already deducted from `pnl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub size: f64,
    pub fees: f64,
    pub pnl: f64,
    pub exit_reason: ExitReason,
}

/// What closing `position` at market price `close` would realize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub exit_price: f64,
    pub fees: f64,
    pub pnl: f64,
}

pub fn settle(position: &Position, close: f64, costs: &ExecutionCosts) -> Settlement {
    let exit_price = costs.exit_fill(close);
    let exit_fee = costs.fee(exit_price * position.size);
    let fees = position.entry_fee + exit_fee;
    let pnl = (exit_price - position.entry_price) * position.size - fees;
    Settlement {
        exit_price,
        fees,
        pnl,
    }
}

/// Owned by one run. The balance only changes inside [`Portfolio::update_after_trade`].
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    initial_balance: f64,
    balance: f64,
    realized_pnl: f64,
    total_fees: f64,
    costs: ExecutionCosts,
    trade_log: Vec<Trade>,
}

impl Portfolio {
    pub fn new(initial_balance: f64, costs: ExecutionCosts) -> Self {
        Portfolio {
            initial_balance,
            balance: initial_balance,
            realized_pnl: 0.0,
            total_fees: 0.0,
            costs,
            trade_log: Vec::new(),
        }
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn realized_pnl(&self) -> f64 {
        self.realized_pnl
    }

    pub fn total_fees(&self) -> f64 {
        self.total_fees
    }

    pub fn costs(&self) -> &ExecutionCosts {
        &self.costs
    }

    /// Closed trades in exit order.
    pub fn trades(&self) -> &[Trade] {
        &self.trade_log
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trade_log
    }

    /// Close `position` at market price `close`.
    ///
    /// Takes the position by value: a position can be settled once, and there
    /// is no way to call this without one.
    pub fn update_after_trade(
        &mut self,
        position: Position,
        close: f64,
        exit_time: NaiveDateTime,
        exit_reason: ExitReason,
    ) -> &Trade {
        let Settlement {
            exit_price,
            fees,
            pnl,
        } = settle(&position, close, &self.costs);

        self.balance += pnl;
        self.realized_pnl += pnl;
        self.total_fees += fees;

        info!(
            %exit_time,
            reason = %exit_reason,
            entry_price = position.entry_price,
            exit_price,
            size = position.size,
            pnl,
            balance = self.balance,
            "position closed"
        );

        self.trade_log.push(Trade {
            entry_time: position.entry_time,
            exit_time,
            entry_price: position.entry_price,
            exit_price,
            size: position.size,
            fees,
            pnl,
            exit_reason,
        });
        &self.trade_log[self.trade_log.len() - 1]
    }
}
