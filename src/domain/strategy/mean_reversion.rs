//! Bollinger band / RSI mean reversion.
//!
//! Buy when close is below the lower band and RSI is oversold (sentiment may
//! veto). Sell when close recovers above the middle band or RSI turns
//! overbought. The stop uses the same ATR formula as the momentum strategy.

use tracing::{debug, warn};

use super::{atr_stop, SignalStrategy, StrategyConfig, MEAN_REVERSION};
use crate::domain::error::SwingtraderError;
use crate::domain::indicator::IndicatorType;
use crate::domain::market_data::MarketData;
use crate::domain::sentiment::SentimentSignal;
use crate::domain::signal::SignalDecision;

#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversion {
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub atr_period: usize,
    pub atr_multiplier: f64,
    pub veto_threshold: Option<f64>,
}

impl Default for MeanReversion {
    fn default() -> Self {
        MeanReversion {
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            atr_period: 14,
            atr_multiplier: 1.5,
            veto_threshold: None,
        }
    }
}

impl MeanReversion {
    pub fn from_config(config: &StrategyConfig) -> Result<Self, SwingtraderError> {
        let d = MeanReversion::default();
        let rsi_oversold = config.positive("rsi_oversold", d.rsi_oversold)?;
        let rsi_overbought = config.positive("rsi_overbought", d.rsi_overbought)?;
        if rsi_oversold >= rsi_overbought || rsi_overbought > 100.0 {
            return Err(SwingtraderError::invalid(
                "strategy",
                "rsi_oversold",
                "need 0 < rsi_oversold < rsi_overbought <= 100",
            ));
        }
        Ok(MeanReversion {
            bollinger_period: config.window("bollinger_period", d.bollinger_period)?,
            bollinger_std_dev: config.positive("bollinger_std_dev", d.bollinger_std_dev)?,
            rsi_period: config.window("rsi_period", d.rsi_period)?,
            rsi_oversold,
            rsi_overbought,
            atr_period: config.window("atr_period", d.atr_period)?,
            atr_multiplier: config.positive("atr_multiplier", d.atr_multiplier)?,
            veto_threshold: config.veto_threshold()?,
        })
    }

    fn bands(&self) -> IndicatorType {
        IndicatorType::Bollinger {
            period: self.bollinger_period,
            stddev_mult_x100: (self.bollinger_std_dev * 100.0).round() as u32,
        }
    }

    fn rsi(&self) -> IndicatorType {
        IndicatorType::Rsi(self.rsi_period)
    }

    fn atr(&self) -> IndicatorType {
        IndicatorType::Atr(self.atr_period)
    }
}

impl SignalStrategy for MeanReversion {
    fn name(&self) -> &'static str {
        MEAN_REVERSION
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![self.bands(), self.rsi(), self.atr()]
    }

    fn decide(
        &self,
        data: &MarketData,
        index: usize,
        sentiment: &SentimentSignal,
    ) -> SignalDecision {
        let Some(bar) = data.bar(index) else {
            return SignalDecision::hold();
        };
        let (Some((_, middle, lower)), Some(rsi), Some(atr)) = (
            data.bands(self.bands(), index),
            data.value(self.rsi(), index),
            data.value(self.atr(), index),
        ) else {
            debug!(index, "indicator warm-up, holding");
            return SignalDecision::hold();
        };

        if bar.close < lower && rsi < self.rsi_oversold {
            if sentiment.is_negative(self.veto_threshold) {
                warn!(
                    timestamp = %bar.timestamp,
                    label = %sentiment.label,
                    "oversold entry vetoed by negative sentiment"
                );
                return SignalDecision::hold();
            }
            return SignalDecision::buy(atr_stop(bar.low, atr, self.atr_multiplier));
        }

        if bar.close > middle || rsi > self.rsi_overbought {
            return SignalDecision::sell();
        }

        SignalDecision::hold()
    }
}
