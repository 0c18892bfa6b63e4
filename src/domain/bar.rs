//! OHLCV bar representation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One OHLCV observation. Timestamps are strictly increasing within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Index of the first bar whose timestamp does not strictly follow its predecessor.
pub fn first_unordered(bars: &[Bar]) -> Option<usize> {
    bars.windows(2)
        .position(|w| w[1].timestamp <= w[0].timestamp)
        .map(|i| i + 1)
}
