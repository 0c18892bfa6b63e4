//! The single open position and the FLAT/LONG state machine around it.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use super::bar::Bar;
use super::portfolio::{settle, ExitReason, Portfolio};
use super::risk::{size_position, RiskConfig, SizingOutcome};
use super::signal::{SignalAction, SignalDecision};

/// An open long position. Not `Clone`: the state machine holds the only
/// instance and hands it to the ledger by value when it closes.
#[derive(Debug, PartialEq)]
pub struct Position {
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub size: f64,
    pub stop_loss: f64,
    pub entry_fee: f64,
}

impl Position {
    pub fn stop_triggered(&self, close: f64) -> bool {
        close <= self.stop_loss
    }
}

#[derive(Debug, Default, PartialEq)]
pub enum PositionState {
    #[default]
    Flat,
    Long(Position),
}

/// What a single [`PositionState::step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    None,
    Entered {
        entry_price: f64,
        size: f64,
        stop_loss: f64,
    },
    Exited {
        reason: ExitReason,
        pnl: f64,
    },
    /// Buy while already long; dropped, not queued.
    BuyIgnored,
    /// Buy that could not be sized (missing, non-positive or too-high stop).
    Rejected,
}

impl PositionState {
    pub fn is_long(&self) -> bool {
        matches!(self, PositionState::Long(_))
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            PositionState::Long(p) => Some(p),
            PositionState::Flat => None,
        }
    }

    pub fn into_position(self) -> Option<Position> {
        match self {
            PositionState::Long(p) => Some(p),
            PositionState::Flat => None,
        }
    }

    /// Hypothetical P&L of closing the open position at `close`.
    pub fn unrealized_pnl(&self, close: f64, ledger: &Portfolio) -> Option<f64> {
        self.position().map(|p| settle(p, close, ledger.costs()).pnl)
    }

    /// Advance one bar.
    ///
    /// A stop hit on a long position exits at the bar's close and `decide` is
    /// never called. Otherwise `decide` produces the bar's signal.
    pub fn step<F>(
        &mut self,
        bar: &Bar,
        ledger: &mut Portfolio,
        risk: &RiskConfig,
        decide: F,
    ) -> Transition
    where
        F: FnOnce() -> SignalDecision,
    {
        if self.position().is_some_and(|p| p.stop_triggered(bar.close)) {
            return self.close(bar, ledger, ExitReason::StopLoss);
        }

        let decision = decide();
        match (self.is_long(), decision.action) {
            (false, SignalAction::Buy) => self.enter(bar, ledger, risk, &decision),
            (true, SignalAction::Sell) => self.close(bar, ledger, ExitReason::Signal),
            (true, SignalAction::Buy) => {
                debug!(timestamp = %bar.timestamp, "buy while long ignored");
                Transition::BuyIgnored
            }
            _ => Transition::None,
        }
    }

    /// Close the open position at the bar's close. No-op when flat.
    pub fn close(&mut self, bar: &Bar, ledger: &mut Portfolio, reason: ExitReason) -> Transition {
        let PositionState::Long(position) = std::mem::take(self) else {
            return Transition::None;
        };
        let trade = ledger.update_after_trade(position, bar.close, bar.timestamp, reason);
        Transition::Exited {
            reason,
            pnl: trade.pnl,
        }
    }

    fn enter(
        &mut self,
        bar: &Bar,
        ledger: &Portfolio,
        risk: &RiskConfig,
        decision: &SignalDecision,
    ) -> Transition {
        let Some(stop_loss) = decision.usable_stop() else {
            warn!(
                timestamp = %bar.timestamp,
                stop = ?decision.stop_loss,
                "buy without a usable stop discarded"
            );
            return Transition::Rejected;
        };

        let costs = ledger.costs();
        let entry_price = costs.entry_fill(bar.close);
        let size = match size_position(
            ledger.balance(),
            risk.risk_per_trade_percent,
            entry_price,
            stop_loss,
        ) {
            SizingOutcome::Sized(size) => size,
            outcome => {
                warn!(
                    timestamp = %bar.timestamp,
                    entry_price,
                    stop_loss,
                    ?outcome,
                    "buy could not be sized"
                );
                return Transition::Rejected;
            }
        };

        info!(
            timestamp = %bar.timestamp,
            entry_price,
            size,
            stop_loss,
            "position opened"
        );
        *self = PositionState::Long(Position {
            entry_price,
            entry_time: bar.timestamp,
            size,
            stop_loss,
            entry_fee: costs.fee(entry_price * size),
        });
        Transition::Entered {
            entry_price,
            size,
            stop_loss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::ExecutionCosts;
    use chrono::NaiveDate;

    fn bar(day: u32, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 2, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: close,
            high: close + 1.0,
            low,
            close,
            volume: 10.0,
        }
    }

    fn setup() -> (PositionState, Portfolio, RiskConfig) {
        let risk = RiskConfig::new(1000.0, 2.0);
        (
            PositionState::Flat,
            Portfolio::new(risk.capital_base, risk.costs()),
            risk,
        )
    }

    #[test]
    fn flat_buy_opens_sized_position() {
        let (mut state, mut ledger, risk) = setup();
        let t = state.step(&bar(1, 99.0, 100.0), &mut ledger, &risk, || {
            SignalDecision::buy(95.0)
        });
        assert_eq!(
            t,
            Transition::Entered {
                entry_price: 100.0,
                size: 4.0,
                stop_loss: 95.0
            }
        );
        let p = state.position().unwrap();
        assert_eq!(p.size, 4.0);
        assert_eq!(p.entry_time, bar(1, 0.0, 0.0).timestamp);
        assert_eq!(ledger.balance(), 1000.0);
    }

    #[test]
    fn invalid_stop_keeps_flat() {
        let (mut state, mut ledger, risk) = setup();
        let t = state.step(&bar(1, 99.0, 100.0), &mut ledger, &risk, || {
            SignalDecision::buy(100.0)
        });
        assert_eq!(t, Transition::Rejected);
        assert!(!state.is_long());

        let t = state.step(&bar(2, 99.0, 100.0), &mut ledger, &risk, || {
            SignalDecision::buy(-1.0)
        });
        assert_eq!(t, Transition::Rejected);
        assert!(!state.is_long());
    }

    #[test]
    fn buy_while_long_is_ignored() {
        let (mut state, mut ledger, risk) = setup();
        state.step(&bar(1, 99.0, 100.0), &mut ledger, &risk, || SignalDecision::buy(95.0));
        let t = state.step(&bar(2, 100.0, 101.0), &mut ledger, &risk, || {
            SignalDecision::buy(90.0)
        });
        assert_eq!(t, Transition::BuyIgnored);
        assert_eq!(state.position().unwrap().stop_loss, 95.0);
    }

    #[test]
    fn sell_while_long_closes_once() {
        let (mut state, mut ledger, risk) = setup();
        state.step(&bar(1, 99.0, 100.0), &mut ledger, &risk, || SignalDecision::buy(95.0));
        let t = state.step(&bar(2, 104.0, 105.0), &mut ledger, &risk, SignalDecision::sell);
        assert_eq!(
            t,
            Transition::Exited {
                reason: ExitReason::Signal,
                pnl: 20.0
            }
        );
        assert!(!state.is_long());
        assert_eq!(ledger.trades().len(), 1);
        assert_eq!(ledger.balance(), 1020.0);
    }

    #[test]
    fn sell_while_flat_does_nothing() {
        let (mut state, mut ledger, risk) = setup();
        let t = state.step(&bar(1, 99.0, 100.0), &mut ledger, &risk, SignalDecision::sell);
        assert_eq!(t, Transition::None);
        assert!(ledger.trades().is_empty());
    }

    #[test]
    fn stop_has_priority_and_skips_signal() {
        let (mut state, mut ledger, risk) = setup();
        state.step(&bar(1, 99.0, 100.0), &mut ledger, &risk, || SignalDecision::buy(95.0));

        let mut consulted = false;
        let t = state.step(&bar(2, 93.0, 94.0), &mut ledger, &risk, || {
            consulted = true;
            SignalDecision::buy(80.0)
        });
        assert!(!consulted);
        assert_eq!(
            t,
            Transition::Exited {
                reason: ExitReason::StopLoss,
                pnl: -24.0
            }
        );
        assert!(!state.is_long());
    }

    #[test]
    fn stop_triggers_on_close_equal_to_stop() {
        let (mut state, mut ledger, risk) = setup();
        state.step(&bar(1, 99.0, 100.0), &mut ledger, &risk, || SignalDecision::buy(95.0));
        let t = state.step(&bar(2, 94.0, 95.0), &mut ledger, &risk, SignalDecision::hold);
        assert!(matches!(
            t,
            Transition::Exited {
                reason: ExitReason::StopLoss,
                ..
            }
        ));
    }

    #[test]
    fn reentry_after_stop_on_next_bar() {
        let (mut state, mut ledger, risk) = setup();
        state.step(&bar(1, 99.0, 100.0), &mut ledger, &risk, || SignalDecision::buy(95.0));
        state.step(&bar(2, 93.0, 94.0), &mut ledger, &risk, SignalDecision::hold);
        let t = state.step(&bar(3, 93.0, 94.0), &mut ledger, &risk, || {
            SignalDecision::buy(90.0)
        });
        assert!(matches!(t, Transition::Entered { .. }));
        assert_eq!(ledger.trades().len(), 1);
    }

    #[test]
    fn close_when_flat_is_noop() {
        let (mut state, mut ledger, _) = setup();
        let t = state.close(&bar(1, 99.0, 100.0), &mut ledger, ExitReason::EndOfData);
        assert_eq!(t, Transition::None);
    }

    #[test]
    fn entry_fee_recorded_on_position() {
        let risk = RiskConfig {
            taker_fee_percent: 0.1,
            ..RiskConfig::new(1000.0, 2.0)
        };
        let mut ledger = Portfolio::new(1000.0, ExecutionCosts::new(0.1, 0.0));
        let mut state = PositionState::Flat;
        state.step(&bar(1, 99.0, 100.0), &mut ledger, &risk, || SignalDecision::buy(95.0));
        let p = state.position().unwrap();
        assert!((p.entry_fee - 0.4).abs() < 1e-12);
    }

    #[test]
    fn unrealized_pnl_marks_to_close() {
        let (mut state, mut ledger, risk) = setup();
        assert_eq!(state.unrealized_pnl(100.0, &ledger), None);
        state.step(&bar(1, 99.0, 100.0), &mut ledger, &risk, || SignalDecision::buy(95.0));
        assert_eq!(state.unrealized_pnl(103.0, &ledger), Some(12.0));
    }
}
