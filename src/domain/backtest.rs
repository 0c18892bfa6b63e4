//! Backtest driver: the one component that advances simulated time.
//!
//! Bars are visited once, in order. Per bar: stop check, then signal, then
//! sizing and transition, then ledger update. Stopping early is safe at any
//! bar boundary; [`Backtest::finish`] reports whatever state was reached.

use tracing::{debug, info};

use super::bar::{first_unordered, Bar};
use super::error::{BacktestFailure, SwingtraderError};
use super::market_data::MarketData;
use super::portfolio::{ExitReason, Portfolio};
use super::position::{Position, PositionState, Transition};
use super::report::{OpenPositionReport, Report};
use super::risk::RiskConfig;
use super::strategy::SignalStrategy;
use crate::ports::sentiment_port::SentimentPort;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BacktestOptions {
    /// Force-close a position still open after the last bar.
    pub close_open_position: bool,
}

#[derive(Debug)]
pub struct BacktestResult {
    pub symbol: String,
    pub strategy: &'static str,
    pub bars_processed: usize,
    pub portfolio: Portfolio,
    /// Still open at the end; not part of realized P&L.
    pub open_position: Option<Position>,
    pub report: Report,
}

pub struct Backtest<'a> {
    strategy: &'a dyn SignalStrategy,
    sentiment: &'a dyn SentimentPort,
    risk: RiskConfig,
    options: BacktestOptions,
    data: MarketData,
    ledger: Portfolio,
    state: PositionState,
    next: usize,
}

impl<'a> Backtest<'a> {
    /// Validate the bar sequence and compute the strategy's indicators.
    ///
    /// Fails on an empty sequence, on timestamps that are not strictly
    /// increasing, or on fewer bars than the strategy's longest warm-up.
    pub fn new(
        symbol: &str,
        bars: Vec<Bar>,
        strategy: &'a dyn SignalStrategy,
        sentiment: &'a dyn SentimentPort,
        risk: RiskConfig,
        options: BacktestOptions,
    ) -> Result<Self, SwingtraderError> {
        if bars.is_empty() {
            return Err(SwingtraderError::NoData {
                symbol: symbol.to_string(),
            });
        }
        if let Some(index) = first_unordered(&bars) {
            return Err(SwingtraderError::UnorderedBars { index });
        }
        let minimum = strategy.min_bars();
        if bars.len() < minimum {
            return Err(SwingtraderError::InsufficientData {
                symbol: symbol.to_string(),
                bars: bars.len(),
                minimum,
            });
        }

        let data = strategy.compute_indicators(symbol, bars);
        info!(
            symbol,
            strategy = strategy.name(),
            bars = data.bar_count(),
            capital = risk.capital_base,
            "backtest started"
        );

        Ok(Backtest {
            strategy,
            sentiment,
            risk,
            options,
            data,
            ledger: Portfolio::new(risk.capital_base, risk.costs()),
            state: PositionState::Flat,
            next: 0,
        })
    }

    pub fn bars_processed(&self) -> usize {
        self.next
    }

    pub fn is_done(&self) -> bool {
        self.next >= self.data.bar_count()
    }

    pub fn ledger(&self) -> &Portfolio {
        &self.ledger
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    /// Process the next bar. `None` once every bar has been visited.
    pub fn step(&mut self) -> Option<Transition> {
        let index = self.next;
        let bar = self.data.bar(index)?;
        self.next += 1;

        let strategy = self.strategy;
        let sentiment = self.sentiment;
        let data = &self.data;
        let transition = self.state.step(bar, &mut self.ledger, &self.risk, || {
            let decision = strategy.decide(data, index, &sentiment.sentiment_at(bar.timestamp));
            debug!(index, timestamp = %bar.timestamp, action = %decision.action, "signal");
            decision
        });
        Some(transition)
    }

    /// Walk the remaining bars and finish.
    pub fn run_to_end(mut self) -> BacktestResult {
        while self.step().is_some() {}
        self.finish()
    }

    /// Stop here and summarize. An open position is marked at the last
    /// processed bar, or closed there when `close_open_position` is set.
    pub fn finish(mut self) -> BacktestResult {
        let last_bar = self.next.checked_sub(1).and_then(|i| self.data.bar(i));

        if let Some(bar) = last_bar {
            if self.options.close_open_position && self.state.is_long() {
                self.state.close(bar, &mut self.ledger, ExitReason::EndOfData);
            }
        }

        let open = match (self.state.position(), last_bar) {
            (Some(position), Some(bar)) => {
                let unrealized = self
                    .state
                    .unrealized_pnl(bar.close, &self.ledger)
                    .unwrap_or(0.0);
                Some(OpenPositionReport::new(
                    position,
                    bar.timestamp,
                    bar.close,
                    unrealized,
                ))
            }
            _ => None,
        };

        let report = Report::generate(&self.ledger, open);
        info!(
            symbol = %self.data.symbol,
            bars = self.next,
            trades = self.ledger.trades().len(),
            balance = self.ledger.balance(),
            open = self.state.is_long(),
            "backtest finished"
        );

        BacktestResult {
            symbol: self.data.symbol,
            strategy: self.strategy.name(),
            bars_processed: self.next,
            portfolio: self.ledger,
            open_position: self.state.into_position(),
            report,
        }
    }
}

/// Run a complete backtest over `bars`.
pub fn run_backtest(
    symbol: &str,
    bars: Vec<Bar>,
    strategy: &dyn SignalStrategy,
    sentiment: &dyn SentimentPort,
    risk: RiskConfig,
    options: BacktestOptions,
) -> Result<BacktestResult, BacktestFailure> {
    let backtest = Backtest::new(symbol, bars, strategy, sentiment, risk, options)?;
    Ok(backtest.run_to_end())
}
