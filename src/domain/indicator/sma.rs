//! Simple Moving Average of close.
//!
//! SMA[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_sma(bars: &[Bar], window: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        let valid = window > 0 && i + 1 >= window;
        let sma = if valid {
            let sum: f64 = bars[i + 1 - window..=i].iter().map(|b| b.close).sum();
            sum / window as f64
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            timestamp: bars[i].timestamp,
            valid,
            value: IndicatorValue::Simple(sma),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(window),
        values,
    }
}
