//! Simulation core: bars, indicators, signals, sizing, position, ledger, report.

pub mod backtest;
pub mod bar;
pub mod config_validation;
pub mod error;
pub mod execution;
pub mod indicator;
pub mod indicator_helpers;
pub mod market_data;
pub mod portfolio;
pub mod position;
pub mod report;
pub mod risk;
pub mod sentiment;
pub mod signal;
pub mod strategy;
