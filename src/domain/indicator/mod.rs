//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values, one point per bar
//!
//! Warm-up points are kept in the series with `valid = false` so that every
//! series lines up index-for-index with the bar sequence it was computed from.

pub mod atr;
pub mod bollinger;
pub mod rsi;
pub mod sma;

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Bollinger { upper: f64, middle: f64, lower: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Atr(usize),
    Rsi(usize),
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl IndicatorType {
    /// Number of leading bars for which the indicator is undefined.
    pub fn warmup(&self) -> usize {
        match self {
            IndicatorType::Sma(window) => window.saturating_sub(1),
            IndicatorType::Atr(period) | IndicatorType::Rsi(period) => *period,
            IndicatorType::Bollinger { period, .. } => period.saturating_sub(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Scalar value at `index`, or `None` while warming up or out of range.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Simple(v),
                ..
            }) => Some(*v),
            _ => None,
        }
    }

    /// (upper, middle, lower) at `index` for band-shaped series.
    pub fn bands_at(&self, index: usize) -> Option<(f64, f64, f64)> {
        match self.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value:
                    IndicatorValue::Bollinger {
                        upper,
                        middle,
                        lower,
                    },
                ..
            }) => Some((*upper, *middle, *lower)),
            _ => None,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}
