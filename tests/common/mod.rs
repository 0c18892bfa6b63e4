#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use swingtrader::domain::bar::Bar;
use swingtrader::domain::error::SwingtraderError;
use swingtrader::domain::risk::RiskConfig;
use swingtrader::domain::sentiment::{SentimentLabel, SentimentSignal};
use swingtrader::domain::strategy::{
    build_strategy, SignalStrategy, StrategyConfig, MEAN_REVERSION, SENTIMENT_MOMENTUM,
};
use swingtrader::ports::data_port::DataPort;
use swingtrader::ports::sentiment_port::SentimentPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        _timeframe: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, SwingtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SwingtraderError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| start.is_none_or(|s| b.timestamp.date() >= s))
            .filter(|b| end.is_none_or(|e| b.timestamp.date() <= e))
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, SwingtraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Same reading for every bar.
#[derive(Debug, Clone, Copy)]
pub struct FixedSentiment(pub SentimentSignal);

impl SentimentPort for FixedSentiment {
    fn sentiment_at(&self, _timestamp: NaiveDateTime) -> SentimentSignal {
        self.0
    }
}

pub fn neutral() -> FixedSentiment {
    FixedSentiment(SentimentSignal::neutral())
}

pub fn negative() -> FixedSentiment {
    FixedSentiment(SentimentSignal {
        label: SentimentLabel::Negative,
        score: 0.1,
    })
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn day(i: usize) -> NaiveDateTime {
    date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap() + Duration::days(i as i64)
}

/// Daily bars with `high = close + 1` and `low = close - 1`.
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: day(i),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// SMA 2/3 crossover, ATR(2), stop one ATR below the low.
pub fn fast_momentum() -> Box<dyn SignalStrategy> {
    build_strategy(
        &StrategyConfig::new(SENTIMENT_MOMENTUM)
            .with_param("short_window", 2.0)
            .with_param("long_window", 3.0)
            .with_param("atr_period", 2.0)
            .with_param("atr_multiplier", 1.0),
    )
    .unwrap()
}

pub fn fast_mean_reversion() -> Box<dyn SignalStrategy> {
    build_strategy(
        &StrategyConfig::new(MEAN_REVERSION)
            .with_param("bollinger_period", 5.0)
            .with_param("bollinger_std_dev", 1.0)
            .with_param("rsi_period", 3.0)
            .with_param("atr_period", 3.0),
    )
    .unwrap()
}

pub fn risk() -> RiskConfig {
    RiskConfig::new(1000.0, 2.0)
}

/// Bullish cross at index 3 (entry 101, stop 97, size 5) and nothing after.
pub const ENTRY_ONLY: [f64; 5] = [100.0, 99.0, 98.0, 101.0, 103.0];

/// Enters at index 3, exits on the bearish cross at index 7 with a close of 102.
pub const SMALL_WIN: [f64; 8] = [100.0, 99.0, 98.0, 101.0, 103.0, 105.0, 104.0, 102.0];

/// Enters at index 3, the close of 90 at index 5 breaks the 97 stop.
pub const STOPPED_OUT: [f64; 6] = [100.0, 99.0, 98.0, 101.0, 103.0, 90.0];

/// Enters at index 3, bearish cross at index 5 closes at 98, above the stop.
pub const SIGNAL_EXIT: [f64; 6] = [100.0, 99.0, 98.0, 101.0, 103.0, 98.0];

/// Config file content pointing at `data_dir`.
pub fn ini(data_dir: &str, extra: &str) -> String {
    format!(
        "[data]\n\
         path = {data_dir}\n\
         symbol = BTC/USDT\n\
         timeframe = 1d\n\
         \n\
         [risk]\n\
         capital_base = 1000\n\
         risk_per_trade_percent = 2\n\
         \n\
         [strategy]\n\
         name = SENTIMENT_MOMENTUM\n\
         short_window = 2\n\
         long_window = 3\n\
         atr_period = 2\n\
         atr_multiplier = 1\n\
         \n\
         {extra}"
    )
}

/// Bars as CSV in the on-disk layout.
pub fn bars_csv(bars: &[Bar]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp.format("%Y-%m-%d %H:%M:%S"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
