//! Report generation port trait.

use std::path::Path;

use crate::domain::backtest::BacktestRun;
use crate::domain::error::SmaCrossError;

/// Read-only consumer of a finished run (charts, trade log exports).
pub trait ReportPort {
    fn write(&self, run: &BacktestRun<'_>, output_path: &Path) -> Result<(), SmaCrossError>;
}
