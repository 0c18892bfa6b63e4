//! Sentiment sources: a constant reading, or a timestamped schedule from CSV.

use crate::adapters::csv_adapter::parse_timestamp;
use crate::domain::error::SwingtraderError;
use crate::domain::sentiment::{SentimentLabel, SentimentSignal};
use crate::ports::sentiment_port::SentimentPort;
use chrono::NaiveDateTime;
use std::fs;
use std::path::Path;

/// Same reading for every bar.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstantSentiment(pub SentimentSignal);

impl SentimentPort for ConstantSentiment {
    fn sentiment_at(&self, _timestamp: NaiveDateTime) -> SentimentSignal {
        self.0
    }
}

/// Step function over a schedule of `timestamp,label,score` rows. The reading
/// at `t` is the latest entry at or before `t`; neutral before the first entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvSentimentAdapter {
    entries: Vec<(NaiveDateTime, SentimentSignal)>,
}

impl CsvSentimentAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SwingtraderError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SwingtraderError::DataSource {
            reason: format!("failed to read sentiment schedule {}: {}", path.display(), e),
        })?;
        Self::from_csv(&content)
    }

    pub fn from_csv(content: &str) -> Result<Self, SwingtraderError> {
        let bad = |reason: String| SwingtraderError::DataSource { reason };
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut entries = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| bad(format!("sentiment CSV parse error: {}", e)))?;
            let (Some(ts), Some(label), Some(score)) =
                (record.get(0), record.get(1), record.get(2))
            else {
                return Err(bad(format!(
                    "sentiment row {} needs timestamp,label,score",
                    row + 1
                )));
            };

            let timestamp = parse_timestamp(ts)
                .ok_or_else(|| bad(format!("invalid sentiment timestamp '{}'", ts)))?;
            let label: SentimentLabel = label.parse().map_err(bad)?;
            let score: f64 = score
                .trim()
                .parse()
                .map_err(|_| bad(format!("invalid sentiment score '{}'", score)))?;

            entries.push((timestamp, SentimentSignal { label, score }));
        }

        entries.sort_by_key(|(ts, _)| *ts);
        Ok(CsvSentimentAdapter { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SentimentPort for CsvSentimentAdapter {
    fn sentiment_at(&self, timestamp: NaiveDateTime) -> SentimentSignal {
        let idx = self.entries.partition_point(|(ts, _)| *ts <= timestamp);
        match idx {
            0 => SentimentSignal::neutral(),
            i => self.entries[i - 1].1,
        }
    }
}
