//! Structured report export as pretty-printed JSON.
//!
//! Non-finite numbers (an infinite reward/risk ratio) are written as `null`.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SwingtraderError;
use crate::domain::portfolio::Trade;
use crate::domain::report::Report;
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
struct ReportDocument<'a> {
    symbol: &'a str,
    strategy: &'a str,
    bars_processed: usize,
    report: &'a Report,
    trades: &'a [Trade],
}

pub struct JsonReportAdapter;

impl ReportPort for JsonReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), SwingtraderError> {
        let doc = ReportDocument {
            symbol: &result.symbol,
            strategy: result.strategy,
            bars_processed: result.bars_processed,
            report: &result.report,
            trades: result.portfolio.trades(),
        };

        let file = File::create(output_path).map_err(|e| SwingtraderError::Report {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &doc).map_err(|e| SwingtraderError::Report {
            reason: format!("failed to serialize report: {}", e),
        })?;
        writer.flush()?;
        Ok(())
    }
}
