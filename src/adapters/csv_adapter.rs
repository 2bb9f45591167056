//! CSV file price data adapter.
//!
//! One file per ticker, `<base>/<TICKER>.csv`, with a header row. The date
//! column is `date`; the price column is chosen by [`PriceField`]. Header
//! names match case-insensitively, so Yahoo-style exports
//! (`Date,Open,High,Low,Close,Adj Close,Volume`) load as-is.

use crate::domain::error::DualMomError;
use crate::domain::price_series::{PriceField, PricePoint};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn read_all(&self, ticker: &str, field: PriceField) -> Result<Vec<PricePoint>, DualMomError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| DualMomError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr.headers().map_err(|e| DualMomError::Data {
            reason: format!("{}: CSV header error: {}", path.display(), e),
        })?;
        let date_idx = column_index(headers, "date").ok_or_else(|| DualMomError::Data {
            reason: format!("{}: missing date column", path.display()),
        })?;
        let price_idx =
            column_index(headers, field.column_name()).ok_or_else(|| DualMomError::Data {
                reason: format!("{}: missing {} column", path.display(), field),
            })?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| DualMomError::Data {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;

            let date_str = record.get(date_idx).unwrap_or_default();
            let date = parse_row_date(date_str).ok_or_else(|| DualMomError::Data {
                reason: format!("{}: invalid date '{}'", path.display(), date_str),
            })?;

            let raw = record.get(price_idx).unwrap_or_default();
            if is_gap(raw) {
                continue;
            }
            let price: f64 = raw.parse().map_err(|e| DualMomError::Data {
                reason: format!("{}: invalid {} value '{}': {}", path.display(), field, raw, e),
            })?;

            points.push(PricePoint::new(date, price));
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

/// Accepts `YYYY-MM-DD` and timestamps that start with one.
fn parse_row_date(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn is_gap(value: &str) -> bool {
    value.is_empty()
        || value.eq_ignore_ascii_case("null")
        || value.eq_ignore_ascii_case("nan")
        || value.eq_ignore_ascii_case("na")
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        field: PriceField,
    ) -> Result<Vec<PricePoint>, DualMomError> {
        let mut points = self.read_all(ticker, field)?;
        points.retain(|p| p.date >= start_date && p.date <= end_date);
        Ok(points)
    }

    fn list_tickers(&self) -> Result<Vec<String>, DualMomError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| DualMomError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DualMomError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(ticker) = name_str.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
        field: PriceField,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, DualMomError> {
        if !self.csv_path(ticker).exists() {
            return Ok(None);
        }
        let points = self.read_all(ticker, field)?;
        match (points.first(), points.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, points.len()))),
            _ => Ok(None),
        }
    }
}
