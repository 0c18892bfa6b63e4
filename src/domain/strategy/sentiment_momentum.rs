//! SMA crossover with an ATR stop and a sentiment veto on entries.
//!
//! - Bullish cross (short crosses above long): buy with
//!   stop = low - ATR * atr_multiplier, unless sentiment is negative.
//! - Bearish cross (short crosses below long): sell. Sentiment is not consulted.
//! - Anything else, including any warm-up gap at t or t-1: hold.

use tracing::{debug, warn};

use super::{atr_stop, SignalStrategy, StrategyConfig, SENTIMENT_MOMENTUM};
use crate::domain::error::SwingtraderError;
use crate::domain::indicator::IndicatorType;
use crate::domain::market_data::MarketData;
use crate::domain::sentiment::SentimentSignal;
use crate::domain::signal::SignalDecision;

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentMomentum {
    pub short_window: usize,
    pub long_window: usize,
    pub atr_period: usize,
    pub atr_multiplier: f64,
    pub veto_threshold: Option<f64>,
}

impl Default for SentimentMomentum {
    fn default() -> Self {
        SentimentMomentum {
            short_window: 10,
            long_window: 30,
            atr_period: 14,
            atr_multiplier: 1.5,
            veto_threshold: None,
        }
    }
}

impl SentimentMomentum {
    pub fn from_config(config: &StrategyConfig) -> Result<Self, SwingtraderError> {
        let d = SentimentMomentum::default();
        let short_window = config.window("short_window", d.short_window)?;
        let long_window = config.window("long_window", d.long_window)?;
        if short_window >= long_window {
            return Err(SwingtraderError::invalid(
                "strategy",
                "short_window",
                format!(
                    "short_window ({}) must be less than long_window ({})",
                    short_window, long_window
                ),
            ));
        }
        Ok(SentimentMomentum {
            short_window,
            long_window,
            atr_period: config.window("atr_period", d.atr_period)?,
            atr_multiplier: config.positive("atr_multiplier", d.atr_multiplier)?,
            veto_threshold: config.veto_threshold()?,
        })
    }

    fn short(&self) -> IndicatorType {
        IndicatorType::Sma(self.short_window)
    }

    fn long(&self) -> IndicatorType {
        IndicatorType::Sma(self.long_window)
    }

    fn atr(&self) -> IndicatorType {
        IndicatorType::Atr(self.atr_period)
    }
}

impl SignalStrategy for SentimentMomentum {
    fn name(&self) -> &'static str {
        SENTIMENT_MOMENTUM
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![self.short(), self.long(), self.atr()]
    }

    fn decide(
        &self,
        data: &MarketData,
        index: usize,
        sentiment: &SentimentSignal,
    ) -> SignalDecision {
        if index == 0 {
            return SignalDecision::hold();
        }
        let Some(bar) = data.bar(index) else {
            return SignalDecision::hold();
        };

        let values = (
            data.value(self.short(), index - 1),
            data.value(self.long(), index - 1),
            data.value(self.short(), index),
            data.value(self.long(), index),
            data.value(self.atr(), index),
        );
        let (Some(short_prev), Some(long_prev), Some(short_now), Some(long_now), Some(atr)) =
            values
        else {
            debug!(index, "indicator warm-up, holding");
            return SignalDecision::hold();
        };

        if short_prev <= long_prev && short_now > long_now {
            if sentiment.is_negative(self.veto_threshold) {
                warn!(
                    timestamp = %bar.timestamp,
                    label = %sentiment.label,
                    score = sentiment.score,
                    "bullish crossover vetoed by negative sentiment"
                );
                return SignalDecision::hold();
            }
            let stop = atr_stop(bar.low, atr, self.atr_multiplier);
            debug!(timestamp = %bar.timestamp, stop, "bullish crossover");
            return SignalDecision::buy(stop);
        }

        if short_prev >= long_prev && short_now < long_now {
            debug!(timestamp = %bar.timestamp, "bearish crossover");
            return SignalDecision::sell();
        }

        SignalDecision::hold()
    }
}
