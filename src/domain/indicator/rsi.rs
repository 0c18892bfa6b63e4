//! RSI (Relative Strength Index) indicator.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are invalid (need n price changes to compute initial average).

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_rsi(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values: Vec<IndicatorPoint> = bars
        .iter()
        .map(|b| IndicatorPoint {
            timestamp: b.timestamp,
            valid: false,
            value: IndicatorValue::Simple(0.0),
        })
        .collect();

    if period == 0 || bars.len() <= period {
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values,
        };
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = bars
        .windows(2)
        .map(|w| {
            let change = w[1].close - w[0].close;
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    for i in period..bars.len() {
        // values[i] reflects changes up to gains[i - 1]
        if i > period {
            avg_gain = (avg_gain * (period - 1) as f64 + gains[i - 1]) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + losses[i - 1]) / period as f64;
        }
        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        };
        values[i].valid = true;
        values[i].value = IndicatorValue::Simple(rsi);
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}
