//! Indicator dispatch over a bar sequence.

use crate::domain::bar::Bar;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use std::collections::HashMap;

pub fn calculate_indicator(bars: &[Bar], indicator: IndicatorType) -> IndicatorSeries {
    match indicator {
        IndicatorType::Sma(window) => calculate_sma(bars, window),
        IndicatorType::Atr(period) => calculate_atr(bars, period),
        IndicatorType::Rsi(period) => calculate_rsi(bars, period),
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(bars, period, stddev_mult_x100),
    }
}

/// Compute each requested indicator once; duplicates in `types` are ignored.
pub fn compute_indicators(
    bars: &[Bar],
    types: &[IndicatorType],
) -> HashMap<IndicatorType, IndicatorSeries> {
    let mut out = HashMap::with_capacity(types.len());
    for &indicator in types {
        out.entry(indicator)
            .or_insert_with(|| calculate_indicator(bars, indicator));
    }
    out
}
