//! Historical bar source.

use crate::domain::bar::Bar;
use crate::domain::error::SwingtraderError;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `symbol` at `timeframe`, inclusive of both dates when given.
    ///
    /// Implementations hand over bars sorted by timestamp with duplicates removed.
    fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, SwingtraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, SwingtraderError>;
}
