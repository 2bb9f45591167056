//! Weighted multi-horizon momentum scoring.
//!
//! score = 12·(P0/P1m − 1) + 4·(P0/P3m − 1) + 2·(P0/P6m − 1) + 1·(P0/P12m − 1)
//!
//! Every price is resolved as-of its horizon date independently, so two
//! tickers may land on different calendar days for the same nominal date.

use chrono::{Months, NaiveDate};
use std::collections::HashMap;
use std::fmt;

use crate::domain::price_series::PriceTable;
use crate::domain::universe::Universe;

/// (months back, weight) for each lookback horizon.
pub const HORIZONS: [(u32, f64); 4] = [(1, 12.0), (3, 4.0), (6, 2.0), (12, 1.0)];

/// Longest lookback, used to size the data fetch window.
pub const MAX_LOOKBACK_MONTHS: u32 = 12;

/// Momentum of one ticker on one evaluation date.
///
/// `Ineligible` is declared first so the derived ordering ranks it below every
/// `Eligible` score.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum MomentumScore {
    Ineligible,
    Eligible(f64),
}

impl MomentumScore {
    pub fn value(&self) -> Option<f64> {
        match self {
            MomentumScore::Eligible(v) => Some(*v),
            MomentumScore::Ineligible => None,
        }
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, MomentumScore::Eligible(_))
    }

    /// Strictly above zero. Ineligible scores are never positive.
    pub fn is_positive(&self) -> bool {
        matches!(self, MomentumScore::Eligible(v) if *v > 0.0)
    }
}

impl fmt::Display for MomentumScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MomentumScore::Eligible(v) => write!(f, "{v:.4}"),
            MomentumScore::Ineligible => write!(f, "ineligible"),
        }
    }
}

pub type ScoreMap = HashMap<String, MomentumScore>;

pub fn score_ticker(prices: &PriceTable, ticker: &str, date: NaiveDate) -> MomentumScore {
    let p0 = match prices.as_of(ticker, date) {
        Ok(point) => point.price,
        Err(e) => {
            tracing::debug!(%ticker, %date, error = %e, "momentum ineligible");
            return MomentumScore::Ineligible;
        }
    };

    let mut score = 0.0;
    for (months, weight) in HORIZONS {
        let Some(lookback) = date.checked_sub_months(Months::new(months)) else {
            return MomentumScore::Ineligible;
        };
        match prices.as_of(ticker, lookback) {
            Ok(point) => score += weight * (p0 / point.price - 1.0),
            Err(e) => {
                tracing::debug!(%ticker, %date, months, error = %e, "momentum ineligible");
                return MomentumScore::Ineligible;
            }
        }
    }

    if score.is_finite() {
        MomentumScore::Eligible(score)
    } else {
        MomentumScore::Ineligible
    }
}

/// Scores for every risk and safety ticker on `date`.
pub fn score_universe(prices: &PriceTable, universe: &Universe, date: NaiveDate) -> ScoreMap {
    universe
        .all_tickers()
        .map(|ticker| (ticker.clone(), score_ticker(prices, ticker, date)))
        .collect()
}
