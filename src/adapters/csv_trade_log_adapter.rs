//! CSV trade log export implementing ReportPort.

use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

use crate::domain::backtest::BacktestRun;
use crate::domain::error::SmaCrossError;
use crate::domain::trade_log::TradeLogEntry;
use crate::ports::report_port::ReportPort;

/// Writes `date,trade_type,price,return_pct` rows to any writer.
pub fn write_trade_log<W: io::Write>(entries: &[TradeLogEntry], writer: W) -> Result<(), SmaCrossError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in entries {
        wtr.serialize(entry).map_err(|e| SmaCrossError::Report {
            reason: format!("failed to serialize trade on {}: {}", entry.date, e),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub struct CsvTradeLogAdapter;

impl CsvTradeLogAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvTradeLogAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvTradeLogAdapter {
    fn write(&self, run: &BacktestRun<'_>, output_path: &Path) -> Result<(), SmaCrossError> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(output_path)?;
        write_trade_log(&run.trade_log, file)?;

        info!(path = %output_path.display(), trades = run.trade_log.len(), "trade log written");
        Ok(())
    }
}
