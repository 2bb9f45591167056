//! Per-ticker daily price series with as-of lookup.
//!
//! A [`PriceSeries`] is an ordered, gap-tolerant sequence of one price per
//! trading day. [`PriceSeries::as_of`] resolves a nominal calendar date to the
//! latest observation on or before it (last observation carried forward).

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DualMomError;

/// Which daily price a series carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceField {
    #[default]
    Close,
    Open,
}

impl PriceField {
    pub fn column_name(&self) -> &'static str {
        match self {
            PriceField::Close => "close",
            PriceField::Open => "open",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for PriceField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "close" => Ok(PriceField::Close),
            "open" => Ok(PriceField::Open),
            other => Err(format!("unknown price field '{other}' (expected close or open)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from unordered observations.
    ///
    /// Non-finite and non-positive prices are dropped as gaps. When a date
    /// appears more than once the last value wins.
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Self {
        let mut points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.price.is_finite() && p.price > 0.0)
            .collect();
        // Stable sort keeps input order among equal dates, so dedup from the
        // back retains the last one.
        points.sort_by_key(|p| p.date);
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();

        Self {
            ticker: ticker.into(),
            points,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Latest observation dated on or before `date`.
    pub fn as_of(&self, date: NaiveDate) -> Result<PricePoint, DualMomError> {
        let idx = self.points.partition_point(|p| p.date <= date);
        if idx == 0 {
            return Err(DualMomError::NoPriorObservation {
                ticker: self.ticker.clone(),
                date,
            });
        }
        Ok(self.points[idx - 1])
    }
}

/// All series needed for one simulation, keyed by ticker. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    series: HashMap<String, PriceSeries>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.ticker().to_string(), series);
    }

    pub fn get(&self, ticker: &str) -> Option<&PriceSeries> {
        self.series.get(ticker)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// As-of resolution for one ticker. A ticker with no series at all has
    /// no prior observation either.
    pub fn as_of(&self, ticker: &str, date: NaiveDate) -> Result<PricePoint, DualMomError> {
        match self.get(ticker) {
            Some(series) => series.as_of(date),
            None => Err(DualMomError::NoPriorObservation {
                ticker: ticker.to_string(),
                date,
            }),
        }
    }
}

impl FromIterator<PriceSeries> for PriceTable {
    fn from_iter<I: IntoIterator<Item = PriceSeries>>(iter: I) -> Self {
        let mut table = PriceTable::new();
        for series in iter {
            table.insert(series);
        }
        table
    }
}
