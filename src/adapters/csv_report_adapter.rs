//! Tabular export of the rotation history.
//!
//! One row per step: `date, regime, ticker, cash, total_value, return_pct`
//! followed by one quantity column per universe ticker (risk then safety).

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::DualMomError;
use crate::domain::universe::Universe;
use crate::ports::report_port::ReportPort;

const FIXED_COLUMNS: [&str; 6] = [
    "date",
    "regime",
    "ticker",
    "cash",
    "total_value",
    "return_pct",
];

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Build the export in memory.
    pub fn render(result: &BacktestResult, universe: &Universe) -> Result<String, DualMomError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());

        let header: Vec<&str> = FIXED_COLUMNS
            .iter()
            .copied()
            .chain(universe.all_tickers().map(String::as_str))
            .collect();
        wtr.write_record(&header).map_err(report_error)?;

        for record in &result.records {
            let mut row = vec![
                record.date.format("%Y-%m-%d").to_string(),
                record.regime.to_string(),
                record.ticker.clone(),
                format!("{:.2}", record.cash),
                format!("{:.2}", record.total_value),
                format!("{:.2}", record.cumulative_return * 100.0),
            ];
            row.extend(
                universe
                    .all_tickers()
                    .map(|ticker| record.holdings.quantity(ticker).to_string()),
            );
            wtr.write_record(&row).map_err(report_error)?;
        }

        let bytes = wtr.into_inner().map_err(|e| DualMomError::Report {
            reason: e.to_string(),
        })?;
        String::from_utf8(bytes).map_err(|e| DualMomError::Report {
            reason: e.to_string(),
        })
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn report_error(e: csv::Error) -> DualMomError {
    DualMomError::Report {
        reason: format!("CSV write error: {}", e),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        universe: &Universe,
        output_path: &Path,
    ) -> Result<(), DualMomError> {
        let content = Self::render(result, universe)?;
        std::fs::write(output_path, content).map_err(|e| DualMomError::Report {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        })?;
        tracing::info!(path = %output_path.display(), rows = result.records.len(), "wrote CSV report");
        Ok(())
    }
}
