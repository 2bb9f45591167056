//! Standalone SVG line chart of total portfolio value per step.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::DualMomError;
use crate::domain::universe::Universe;
use crate::ports::report_port::ReportPort;

const WIDTH: f64 = 500.0;
const HEIGHT: f64 = 200.0;
const PADDING: f64 = 40.0;

pub struct SvgChartAdapter;

impl SvgChartAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(result: &BacktestResult) -> String {
        let records = &result.records;
        let (Some(first), Some(last)) = (records.first(), records.last()) else {
            return format!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">
  <rect width="100%" height="100%" fill="white"/>
  <text x="{cx:.1}" y="{cy:.1}" text-anchor="middle" font-family="sans-serif" font-size="12">No data</text>
</svg>
"#,
                w = WIDTH,
                h = HEIGHT,
                cx = WIDTH / 2.0,
                cy = HEIGHT / 2.0,
            );
        };

        let min_value = records
            .iter()
            .map(|r| r.total_value)
            .fold(f64::INFINITY, f64::min);
        let max_value = records
            .iter()
            .map(|r| r.total_value)
            .fold(f64::NEG_INFINITY, f64::max);

        let plot_width = WIDTH - 2.0 * PADDING;
        let plot_height = HEIGHT - 2.0 * PADDING;

        let range = max_value - min_value;
        let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
        let scale_x = if records.len() > 1 {
            plot_width / (records.len() - 1) as f64
        } else {
            0.0
        };

        let points: Vec<String> = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let x = PADDING + i as f64 * scale_x;
                let y = HEIGHT - PADDING - (record.total_value - min_value) * scale_y;
                format!("{:.1},{:.1}", x, y)
            })
            .collect();

        let bottom = HEIGHT - PADDING;
        let right = WIDTH - PADDING;

        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">
  <rect width="100%" height="100%" fill="white"/>
  <line x1="{p:.0}" y1="{p:.0}" x2="{p:.0}" y2="{bottom:.0}" stroke="black"/>
  <line x1="{p:.0}" y1="{bottom:.0}" x2="{right:.0}" y2="{bottom:.0}" stroke="black"/>
  <polyline fill="none" stroke="blue" stroke-width="1" points="{points}"/>
  <g font-family="sans-serif" font-size="10">
    <text x="{label_x:.0}" y="{p:.0}" text-anchor="end">{max:.2}</text>
    <text x="{label_x:.0}" y="{bottom:.0}" text-anchor="end">{min:.2}</text>
    <text x="{p:.0}" y="{date_y:.0}" text-anchor="start">{first_date}</text>
    <text x="{right:.0}" y="{date_y:.0}" text-anchor="end">{last_date}</text>
  </g>
  <text x="{cx:.0}" y="20" text-anchor="middle" font-family="sans-serif" font-size="12">Total Value</text>
</svg>
"#,
            w = WIDTH,
            h = HEIGHT,
            p = PADDING,
            bottom = bottom,
            right = right,
            points = points.join(" "),
            label_x = PADDING - 4.0,
            max = max_value,
            min = min_value,
            date_y = bottom + 15.0,
            first_date = first.date.format("%Y-%m-%d"),
            last_date = last.date.format("%Y-%m-%d"),
            cx = WIDTH / 2.0,
        )
    }
}

impl Default for SvgChartAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for SvgChartAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        _universe: &Universe,
        output_path: &Path,
    ) -> Result<(), DualMomError> {
        std::fs::write(output_path, Self::render(result)).map_err(|e| DualMomError::Report {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        })?;
        tracing::info!(path = %output_path.display(), "wrote value chart");
        Ok(())
    }
}
