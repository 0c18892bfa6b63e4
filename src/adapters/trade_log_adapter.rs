//! Trade ledger export as CSV, one row per closed trade in exit order.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SwingtraderError;
use crate::ports::report_port::ReportPort;
use std::path::Path;

pub struct CsvTradeLogAdapter;

impl ReportPort for CsvTradeLogAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), SwingtraderError> {
        let report_error = |e: csv::Error| SwingtraderError::Report {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        };

        let mut writer = csv::Writer::from_path(output_path).map_err(report_error)?;
        for trade in result.portfolio.trades() {
            writer.serialize(trade).map_err(report_error)?;
        }
        writer.flush()?;
        Ok(())
    }
}
