//! Bars plus the indicator series computed over them.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use std::collections::HashMap;

/// Indicator-enriched bar sequence. Owns the bars for the duration of a run;
/// every series has exactly one point per bar.
#[derive(Debug, Clone)]
pub struct MarketData {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub indicators: HashMap<IndicatorType, IndicatorSeries>,
}

impl MarketData {
    pub fn new(symbol: String, bars: Vec<Bar>) -> Self {
        Self {
            symbol,
            bars,
            indicators: HashMap::new(),
        }
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn bar(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// Scalar indicator value at `index`; `None` if missing or still warming up.
    pub fn value(&self, indicator: IndicatorType, index: usize) -> Option<f64> {
        self.indicators.get(&indicator)?.simple_at(index)
    }

    /// Band indicator value at `index` as (upper, middle, lower).
    pub fn bands(&self, indicator: IndicatorType, index: usize) -> Option<(f64, f64, f64)> {
        self.indicators.get(&indicator)?.bands_at(index)
    }
}
