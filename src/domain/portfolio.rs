//! Cash and holdings ledger.

use chrono::NaiveDate;

use crate::domain::error::DualMomError;
use crate::domain::price_series::PriceTable;
use crate::domain::universe::Universe;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    pub ticker: String,
    pub quantity: u64,
}

/// Immutable copy of every holding at the end of a step, in universe order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HoldingsSnapshot {
    holdings: Vec<Holding>,
}

impl HoldingsSnapshot {
    pub fn quantity(&self, ticker: &str) -> u64 {
        self.holdings
            .iter()
            .find(|h| h.ticker == ticker)
            .map(|h| h.quantity)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.iter()
    }

    /// Tickers with a non-zero quantity.
    pub fn held(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.iter().filter(|h| h.quantity > 0)
    }

    pub fn held_count(&self) -> usize {
        self.held().count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub cash: f64,
    holdings: Vec<Holding>,
}

impl Ledger {
    /// Full cash, zero quantity for every universe ticker.
    pub fn new(initial_cash: f64, universe: &Universe) -> Self {
        Ledger {
            cash: initial_cash,
            holdings: universe
                .all_tickers()
                .map(|ticker| Holding {
                    ticker: ticker.clone(),
                    quantity: 0,
                })
                .collect(),
        }
    }

    pub fn quantity(&self, ticker: &str) -> u64 {
        self.holdings
            .iter()
            .find(|h| h.ticker == ticker)
            .map(|h| h.quantity)
            .unwrap_or(0)
    }

    pub fn set_quantity(&mut self, ticker: &str, quantity: u64) {
        match self.holdings.iter_mut().find(|h| h.ticker == ticker) {
            Some(holding) => holding.quantity = quantity,
            None => self.holdings.push(Holding {
                ticker: ticker.to_string(),
                quantity,
            }),
        }
    }

    pub fn held(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.iter().filter(|h| h.quantity > 0)
    }

    pub fn held_count(&self) -> usize {
        self.held().count()
    }

    pub fn snapshot(&self) -> HoldingsSnapshot {
        HoldingsSnapshot {
            holdings: self.holdings.clone(),
        }
    }

    /// cash + Σ quantity × as-of price, over tickers actually held.
    pub fn total_value(&self, prices: &PriceTable, date: NaiveDate) -> Result<f64, DualMomError> {
        let mut value = self.cash;
        for holding in self.held() {
            let point = prices.as_of(&holding.ticker, date)?;
            value += holding.quantity as f64 * point.price;
        }
        Ok(value)
    }
}
