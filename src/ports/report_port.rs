//! Report generation port trait.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::DualMomError;
use crate::domain::universe::Universe;

/// Port for writing a finished rotation history somewhere.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        universe: &Universe,
        output_path: &Path,
    ) -> Result<(), DualMomError>;
}
