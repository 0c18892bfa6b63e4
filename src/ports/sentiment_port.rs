//! Sentiment source consulted once per evaluated bar.

use crate::domain::sentiment::SentimentSignal;
use chrono::NaiveDateTime;

pub trait SentimentPort {
    /// Sentiment in effect at `timestamp`. Must not look past it.
    fn sentiment_at(&self, timestamp: NaiveDateTime) -> SentimentSignal;
}
