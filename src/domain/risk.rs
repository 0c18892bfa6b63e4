//! Fixed-fractional position sizing.
//!
//! `size = balance * risk% / (entry - stop)`: losing the whole distance to
//! the stop costs exactly `risk%` of the current balance.

use crate::domain::execution::ExecutionCosts;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskConfig {
    pub capital_base: f64,
    pub risk_per_trade_percent: f64,
    pub taker_fee_percent: f64,
    pub slippage_percent: f64,
}

impl RiskConfig {
    pub fn new(capital_base: f64, risk_per_trade_percent: f64) -> Self {
        RiskConfig {
            capital_base,
            risk_per_trade_percent,
            taker_fee_percent: 0.0,
            slippage_percent: 0.0,
        }
    }

    pub fn costs(&self) -> ExecutionCosts {
        ExecutionCosts::new(self.taker_fee_percent, self.slippage_percent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingOutcome {
    /// Finite and strictly positive.
    Sized(f64),
    /// Stop not strictly below entry, or not a number.
    InvalidStop,
    /// No risk budget: balance or risk percent is not positive.
    NoRiskBudget,
}

impl SizingOutcome {
    pub fn size(&self) -> f64 {
        match self {
            SizingOutcome::Sized(size) => *size,
            _ => 0.0,
        }
    }
}

pub fn size_position(
    balance: f64,
    risk_per_trade_percent: f64,
    entry_price: f64,
    stop_loss_price: f64,
) -> SizingOutcome {
    let risk_per_unit = entry_price - stop_loss_price;
    if !(risk_per_unit > 0.0) || !risk_per_unit.is_finite() {
        return SizingOutcome::InvalidStop;
    }

    let risk_amount = balance * (risk_per_trade_percent / 100.0);
    if !(risk_amount > 0.0) || !risk_amount.is_finite() {
        return SizingOutcome::NoRiskBudget;
    }

    let size = risk_amount / risk_per_unit;
    if size.is_finite() && size > 0.0 {
        SizingOutcome::Sized(size)
    } else {
        SizingOutcome::InvalidStop
    }
}
