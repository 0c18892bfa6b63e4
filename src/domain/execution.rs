//! Fill simulation: constant slippage offset and percentage taker fee.
//!
//! Only long positions exist, so entries are buys and exits are sells.

/// Costs applied to every fill. Both percentages default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExecutionCosts {
    pub taker_fee_percent: f64,
    pub slippage_percent: f64,
}

impl ExecutionCosts {
    pub fn new(taker_fee_percent: f64, slippage_percent: f64) -> Self {
        ExecutionCosts {
            taker_fee_percent,
            slippage_percent,
        }
    }

    /// Buy fill: `close * (1 + slippage / 100)`.
    pub fn entry_fill(&self, close: f64) -> f64 {
        apply_slippage_entry(close, self.slippage_percent)
    }

    /// Sell fill: `close * (1 - slippage / 100)`.
    pub fn exit_fill(&self, close: f64) -> f64 {
        apply_slippage_exit(close, self.slippage_percent)
    }

    pub fn fee(&self, notional: f64) -> f64 {
        calculate_fee(notional, self.taker_fee_percent)
    }
}

pub fn apply_slippage_entry(market_price: f64, slippage_percent: f64) -> f64 {
    market_price * (1.0 + slippage_percent / 100.0)
}

pub fn apply_slippage_exit(market_price: f64, slippage_percent: f64) -> f64 {
    market_price * (1.0 - slippage_percent / 100.0)
}

pub fn calculate_fee(notional: f64, fee_percent: f64) -> f64 {
    notional.abs() * fee_percent / 100.0
}
