//! Average True Range.
//!
//! TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|) for i >= 1. The first bar has no
//! previous close, so its true range is never used.
//! ATR[i] = mean(TR[i-n+1..=i]) (simple rolling mean, not Wilder smoothing).
//! Warmup: first n bars are invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_atr(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut tr_values: Vec<f64> = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let tr = if i == 0 {
            0.0
        } else {
            bar.true_range(bars[i - 1].close)
        };
        tr_values.push(tr);
    }

    let mut values = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let valid = period > 0 && i >= period;
        let atr = if valid {
            tr_values[i + 1 - period..=i].iter().sum::<f64>() / period as f64
        } else {
            0.0
        };
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: IndicatorValue::Simple(atr),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}
