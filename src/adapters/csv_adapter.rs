//! CSV file bar source.
//!
//! One file per symbol and timeframe: `<SYMBOL>_<timeframe>.csv` with `/` in
//! the symbol written as `-` (`BTC/USDT` at `1h` is `BTC-USDT_1h.csv`).
//! Columns: timestamp,open,high,low,close,volume.

use crate::domain::bar::Bar;
use crate::domain::error::SwingtraderError;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol.replace('/', "-"), timeframe))
    }
}

fn source_error(reason: impl Into<String>) -> SwingtraderError {
    SwingtraderError::DataSource {
        reason: reason.into(),
    }
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD`, or
/// epoch milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        let millis: i64 = raw.parse().ok()?;
        return DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn price_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<f64, SwingtraderError> {
    let raw = record
        .get(index)
        .ok_or_else(|| source_error(format!("missing {} column", name)))?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| source_error(format!("invalid {} value '{}': {}", name, raw, e)))?;
    if !value.is_finite() || value < 0.0 {
        return Err(source_error(format!(
            "{} must be a non-negative number, got {}",
            name, raw
        )));
    }
    Ok(value)
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, SwingtraderError> {
        let path = self.csv_path(symbol, timeframe);
        let content = fs::read_to_string(&path)
            .map_err(|e| source_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| source_error(format!("CSV parse error: {}", e)))?;

            let raw_ts = record
                .get(0)
                .ok_or_else(|| source_error("missing timestamp column"))?;
            let timestamp = parse_timestamp(raw_ts)
                .ok_or_else(|| source_error(format!("invalid timestamp '{}'", raw_ts)))?;

            let day = timestamp.date();
            if start.is_some_and(|s| day < s) || end.is_some_and(|e| day > e) {
                continue;
            }

            bars.push(Bar {
                timestamp,
                open: price_field(&record, 1, "open")?,
                high: price_field(&record, 2, "high")?,
                low: price_field(&record, 3, "low")?,
                close: price_field(&record, 4, "close")?,
                volume: price_field(&record, 5, "volume")?,
            });
        }

        let read = bars.len();
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        if bars.len() < read {
            debug!(symbol, dropped = read - bars.len(), "duplicate timestamps removed");
        }
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SwingtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            source_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| source_error(format!("directory entry error: {}", e)))?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            let Some(stem) = name_str.strip_suffix(".csv") else {
                continue;
            };
            if let Some((symbol, _timeframe)) = stem.rsplit_once('_') {
                symbols.push(symbol.replace('-', "/"));
            }
        }

        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }
}
