//! swingtrader: single-instrument swing strategy backtester.
//!
//! Hexagonal architecture: simulation logic in [`domain`], collaborator traits
//! in [`ports`], file-backed implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
