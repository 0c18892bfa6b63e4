//! Market sentiment input consumed by the signal generator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        };
        f.write_str(s)
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "neutral" => Ok(SentimentLabel::Neutral),
            "negative" => Ok(SentimentLabel::Negative),
            other => Err(format!(
                "unknown sentiment label '{}' (expected positive, neutral or negative)",
                other
            )),
        }
    }
}

/// Label plus a normalized score (0 = most negative, 1 = most positive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentSignal {
    pub label: SentimentLabel,
    pub score: f64,
}

impl SentimentSignal {
    pub fn neutral() -> Self {
        SentimentSignal {
            label: SentimentLabel::Neutral,
            score: 0.5,
        }
    }

    /// Whether this reading vetoes a new long entry.
    ///
    /// With a threshold configured the score decides (veto when
    /// `score <= threshold`); otherwise only a `Negative` label vetoes.
    pub fn is_negative(&self, veto_threshold: Option<f64>) -> bool {
        match veto_threshold {
            Some(threshold) => !(self.score > threshold),
            None => self.label == SentimentLabel::Negative,
        }
    }
}

impl Default for SentimentSignal {
    fn default() -> Self {
        SentimentSignal::neutral()
    }
}
