//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//! Warmup: first (period-1) bars are invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_bollinger(bars: &[Bar], period: usize, stddev_mult_x100: u32) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mult = stddev_mult_x100 as f64 / 100.0;

    for (i, bar) in bars.iter().enumerate() {
        let valid = period > 0 && i + 1 >= period;

        let (upper, middle, lower) = if valid {
            let window = &bars[i + 1 - period..=i];
            let middle: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|b| (b.close - middle).powi(2))
                .sum::<f64>()
                / period as f64;
            let stddev = variance.sqrt();
            (middle + mult * stddev, middle, middle - mult * stddev)
        } else {
            (0.0, 0.0, 0.0)
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            },
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        },
        values,
    }
}
