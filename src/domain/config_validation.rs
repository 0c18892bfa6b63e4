//! Configuration validation.
//!
//! Validates every field before a run and reports the first violation.

use crate::domain::error::SwingtraderError;
use crate::domain::sentiment::SentimentLabel;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    validate_data_config(config)?;
    validate_risk_config(config)?;
    validate_strategy_config(config)?;
    validate_sentiment_config(config)?;
    validate_backtest_options(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    required_string(config, "data", "path")?;
    required_string(config, "data", "symbol")?;
    required_string(config, "data", "timeframe")?;

    let start = date_field(config, "data", "start")?;
    let end = date_field(config, "data", "end")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(SwingtraderError::invalid(
                "data",
                "start",
                "start must not be after end",
            ));
        }
    }
    Ok(())
}

pub fn validate_risk_config(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    let capital = number_field(config, "risk", "capital_base")?
        .ok_or_else(|| SwingtraderError::missing("risk", "capital_base"))?;
    if !(capital > 0.0) || !capital.is_finite() {
        return Err(SwingtraderError::invalid(
            "risk",
            "capital_base",
            "capital_base must be positive",
        ));
    }

    let risk_pct = number_field(config, "risk", "risk_per_trade_percent")?
        .ok_or_else(|| SwingtraderError::missing("risk", "risk_per_trade_percent"))?;
    if !(risk_pct > 0.0 && risk_pct <= 100.0) {
        return Err(SwingtraderError::invalid(
            "risk",
            "risk_per_trade_percent",
            "risk_per_trade_percent must be in (0, 100]",
        ));
    }

    for key in ["taker_fee_percent", "slippage_percent"] {
        if let Some(value) = number_field(config, "risk", key)? {
            if !(value >= 0.0 && value < 100.0) {
                return Err(SwingtraderError::invalid(
                    "risk",
                    key,
                    format!("{} must be in [0, 100)", key),
                ));
            }
        }
    }
    Ok(())
}

/// `name` must be present; every other key must be numeric.
pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    required_string(config, "strategy", "name")?;
    for key in config.section_keys("strategy") {
        if key == "name" {
            continue;
        }
        number_field(config, "strategy", &key)?;
    }
    Ok(())
}

pub fn validate_sentiment_config(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    if let Some(label) = config.get_string("sentiment", "label") {
        label
            .parse::<SentimentLabel>()
            .map_err(|reason| SwingtraderError::invalid("sentiment", "label", reason))?;
    }
    if let Some(score) = number_field(config, "sentiment", "score")? {
        if !(-1.0..=1.0).contains(&score) {
            return Err(SwingtraderError::invalid(
                "sentiment",
                "score",
                "score must be in [-1, 1]",
            ));
        }
    }
    if let Some(schedule) = config.get_string("sentiment", "schedule") {
        if schedule.trim().is_empty() {
            return Err(SwingtraderError::invalid(
                "sentiment",
                "schedule",
                "schedule path is empty",
            ));
        }
    }
    Ok(())
}

pub fn validate_backtest_options(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    if let Some(value) = config.get_string("backtest", "close_open_position") {
        let ok = matches!(
            value.trim().to_lowercase().as_str(),
            "true" | "yes" | "1" | "false" | "no" | "0"
        );
        if !ok {
            return Err(SwingtraderError::invalid(
                "backtest",
                "close_open_position",
                format!("expected a boolean, got '{}'", value.trim()),
            ));
        }
    }
    Ok(())
}

/// Strictly parsed number; `None` when the key is absent.
pub fn number_field(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, SwingtraderError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(SwingtraderError::invalid(
                section,
                key,
                format!("'{}' is not a number", raw.trim()),
            )),
        },
    }
}

/// `YYYY-MM-DD` date; `None` when the key is absent.
pub fn date_field(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, SwingtraderError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                SwingtraderError::invalid(
                    section,
                    key,
                    format!("invalid {} format, expected YYYY-MM-DD", key),
                )
            }),
    }
}

pub fn required_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, SwingtraderError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(SwingtraderError::missing(section, key)),
    }
}
