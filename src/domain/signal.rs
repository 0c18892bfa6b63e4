//! Per-bar trading decision.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalAction::Buy => "buy",
            SignalAction::Sell => "sell",
            SignalAction::Hold => "hold",
        };
        f.write_str(s)
    }
}

/// Fresh per bar, never persisted. `stop_loss` is only set for buys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalDecision {
    pub action: SignalAction,
    pub stop_loss: Option<f64>,
}

impl SignalDecision {
    pub fn buy(stop_loss: f64) -> Self {
        SignalDecision {
            action: SignalAction::Buy,
            stop_loss: Some(stop_loss),
        }
    }

    pub fn sell() -> Self {
        SignalDecision {
            action: SignalAction::Sell,
            stop_loss: None,
        }
    }

    pub fn hold() -> Self {
        SignalDecision {
            action: SignalAction::Hold,
            stop_loss: None,
        }
    }

    /// Stop price of a buy if it is usable (finite and strictly positive).
    pub fn usable_stop(&self) -> Option<f64> {
        self.stop_loss.filter(|s| s.is_finite() && *s > 0.0)
    }
}
