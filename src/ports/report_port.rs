//! Export of a finished run.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SwingtraderError;
use std::path::Path;

/// Port for writing backtest output (trade ledger, summary report).
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), SwingtraderError>;
}
