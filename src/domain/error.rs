//! Domain error types.

use crate::domain::portfolio::Trade;

/// Top-level error type for swingtrader.
#[derive(Debug, thiserror::Error)]
pub enum SwingtraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("bar {index} is not strictly after the previous bar")]
    UnorderedBars { index: usize },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SwingtraderError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SwingtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(section: &str, key: &str) -> Self {
        SwingtraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

/// A run that aborted, together with the trades that closed before the abort.
#[derive(Debug, thiserror::Error)]
#[error("backtest aborted after {} completed trades: {error}", completed_trades.len())]
pub struct BacktestFailure {
    pub error: SwingtraderError,
    pub completed_trades: Vec<Trade>,
}

impl From<SwingtraderError> for BacktestFailure {
    fn from(error: SwingtraderError) -> Self {
        BacktestFailure {
            error,
            completed_trades: Vec::new(),
        }
    }
}

impl From<&SwingtraderError> for std::process::ExitCode {
    fn from(err: &SwingtraderError) -> Self {
        let code: u8 = match err {
            SwingtraderError::Io(_) | SwingtraderError::Report { .. } => 1,
            SwingtraderError::ConfigParse { .. }
            | SwingtraderError::ConfigMissing { .. }
            | SwingtraderError::ConfigInvalid { .. } => 2,
            SwingtraderError::DataSource { .. } => 3,
            SwingtraderError::UnknownStrategy { .. } => 4,
            SwingtraderError::NoData { .. }
            | SwingtraderError::InsufficientData { .. }
            | SwingtraderError::UnorderedBars { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
