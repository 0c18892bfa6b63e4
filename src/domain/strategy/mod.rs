//! Strategy configuration and the signal-generating strategies.
//!
//! A strategy is selected by name from a closed set and exposes one
//! capability: compute the indicators it needs, then decide per bar.
//! Decisions are pure functions of the bars up to the evaluated index and
//! the sentiment reading for that bar.

pub mod mean_reversion;
pub mod sentiment_momentum;

use crate::domain::bar::Bar;
use crate::domain::error::SwingtraderError;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::market_data::MarketData;
use crate::domain::sentiment::SentimentSignal;
use crate::domain::signal::SignalDecision;
use std::collections::BTreeMap;

pub use mean_reversion::MeanReversion;
pub use sentiment_momentum::SentimentMomentum;

/// Strategy name plus its named numeric parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrategyConfig {
    pub name: String,
    pub params: BTreeMap<String, f64>,
}

impl StrategyConfig {
    pub fn new(name: impl Into<String>) -> Self {
        StrategyConfig {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: f64) -> Self {
        self.params.insert(key.to_string(), value);
        self
    }

    pub fn param(&self, key: &str) -> Option<f64> {
        self.params.get(key).copied()
    }

    /// Positive finite parameter, or `default` when absent.
    pub fn positive(&self, key: &str, default: f64) -> Result<f64, SwingtraderError> {
        match self.param(key) {
            None => Ok(default),
            Some(v) if v.is_finite() && v > 0.0 => Ok(v),
            Some(v) => Err(SwingtraderError::invalid(
                "strategy",
                key,
                format!("must be a positive number, got {}", v),
            )),
        }
    }

    /// Positive whole-number parameter (window lengths), or `default` when absent.
    pub fn window(&self, key: &str, default: usize) -> Result<usize, SwingtraderError> {
        match self.param(key) {
            None => Ok(default),
            Some(v) if v.is_finite() && v >= 1.0 && v.fract() == 0.0 => Ok(v as usize),
            Some(v) => Err(SwingtraderError::invalid(
                "strategy",
                key,
                format!("must be a positive integer, got {}", v),
            )),
        }
    }

    /// Optional sentiment score threshold at or below which buys are vetoed.
    pub fn veto_threshold(&self) -> Result<Option<f64>, SwingtraderError> {
        match self.param("veto_threshold") {
            None => Ok(None),
            Some(v) if v.is_finite() => Ok(Some(v)),
            Some(v) => Err(SwingtraderError::invalid(
                "strategy",
                "veto_threshold",
                format!("must be finite, got {}", v),
            )),
        }
    }
}

/// Common capability of every strategy variant.
pub trait SignalStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn required_indicators(&self) -> Vec<IndicatorType>;

    /// Fewest bars for which every required indicator has at least one valid point.
    fn min_bars(&self) -> usize {
        self.required_indicators()
            .iter()
            .map(|i| i.warmup() + 1)
            .max()
            .unwrap_or(1)
    }

    fn compute_indicators(&self, symbol: &str, bars: Vec<Bar>) -> MarketData {
        let indicators = compute_indicators(&bars, &self.required_indicators());
        let mut data = MarketData::new(symbol.to_string(), bars);
        data.indicators = indicators;
        data
    }

    /// Decision for the bar at `index`. Must only read bars `0..=index`.
    fn decide(&self, data: &MarketData, index: usize, sentiment: &SentimentSignal)
        -> SignalDecision;
}

pub const SENTIMENT_MOMENTUM: &str = "SENTIMENT_MOMENTUM";
pub const MEAN_REVERSION: &str = "MEAN_REVERSION";

fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase().replace(['-', ' '], "_")
}

/// Resolve a configured strategy name into its implementation.
pub fn build_strategy(config: &StrategyConfig) -> Result<Box<dyn SignalStrategy>, SwingtraderError> {
    match normalize_name(&config.name).as_str() {
        SENTIMENT_MOMENTUM => Ok(Box::new(SentimentMomentum::from_config(config)?)),
        MEAN_REVERSION => Ok(Box::new(MeanReversion::from_config(config)?)),
        _ => Err(SwingtraderError::UnknownStrategy {
            name: config.name.clone(),
        }),
    }
}

/// `low - atr * multiplier`, the protective stop shared by both strategies.
pub(crate) fn atr_stop(low: f64, atr: f64, multiplier: f64) -> f64 {
    low - atr * multiplier
}
