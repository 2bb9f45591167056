#![allow(dead_code)]

use chrono::{Months, NaiveDate};
use dualmom::domain::backtest::BacktestConfig;
use dualmom::domain::error::DualMomError;
pub use dualmom::domain::price_series::{PriceField, PricePoint};
use dualmom::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_points(mut self, ticker: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(ticker.to_string(), points);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        _field: PriceField,
    ) -> Result<Vec<PricePoint>, DualMomError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(DualMomError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_tickers(&self) -> Result<Vec<String>, DualMomError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
        _field: PriceField,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, DualMomError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(DualMomError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(ticker) {
            Some(points) if !points.is_empty() => {
                let min = points.iter().map(|p| p.date).min().unwrap();
                let max = points.iter().map(|p| p.date).max().unwrap();
                Ok(Some((min, max, points.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// One observation per month starting at `start`, one per price.
pub fn monthly_points(start: &str, prices: &[f64]) -> Vec<PricePoint> {
    let start = date(start);
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            PricePoint::new(start.checked_add_months(Months::new(i as u32)).unwrap(), price)
        })
        .collect()
}

/// `n` consecutive calendar days starting at `start`, priced by `f(day_index)`.
pub fn daily_points(start: &str, n: usize, f: impl Fn(usize) -> f64) -> Vec<PricePoint> {
    let start = date(start);
    (0..n)
        .map(|i| PricePoint::new(start + chrono::Duration::days(i as i64), f(i)))
        .collect()
}

pub fn make_config(start: &str, end: &str) -> BacktestConfig {
    BacktestConfig {
        start_date: date(start),
        end_date: date(end),
        initial_cash: 1_000_000.0,
        buy_commission: 0.001,
        sell_commission: 0.001,
        price_field: PriceField::Close,
    }
}

/// Write `<dir>/<TICKER>.csv` in the Yahoo export layout.
pub fn write_price_csv(dir: &std::path::Path, ticker: &str, points: &[PricePoint]) {
    let mut content = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for p in points {
        content.push_str(&format!(
            "{},{:.4},{:.4},{:.4},{:.4},{:.4},1000\n",
            p.date, p.price, p.price, p.price, p.price, p.price
        ));
    }
    std::fs::write(dir.join(format!("{}.csv", ticker)), content).unwrap();
}
