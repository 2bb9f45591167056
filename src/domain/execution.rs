//! Sell and buy phases of a rebalancing step.
//!
//! Liquidation sells every held ticker at its as-of price less the sell
//! commission. Acquisition buys the largest whole number of units whose cost
//! including buy commission fits in cash.

use chrono::NaiveDate;

use crate::domain::error::DualMomError;
use crate::domain::portfolio::Ledger;
use crate::domain::price_series::PriceTable;

/// Proportional commission rates, each in [0, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionConfig {
    pub buy_commission: f64,
    pub sell_commission: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            buy_commission: 0.001,
            sell_commission: 0.001,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    pub ticker: String,
    pub quantity: u64,
    pub price: f64,
    pub proceeds: f64,
}

/// Result of a buy attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Purchase {
    Filled {
        ticker: String,
        quantity: u64,
        price: f64,
        cost: f64,
    },
    /// Not even one unit was affordable; cash is untouched.
    InsufficientFunds { ticker: String, price: f64 },
}

impl Purchase {
    pub fn quantity(&self) -> u64 {
        match self {
            Purchase::Filled { quantity, .. } => *quantity,
            Purchase::InsufficientFunds { .. } => 0,
        }
    }
}

/// Whole units affordable at `unit_cost`, never overspending `cash`.
pub fn affordable_quantity(cash: f64, unit_cost: f64) -> u64 {
    if cash.is_nan() || unit_cost.is_nan() || cash <= 0.0 || unit_cost <= 0.0 {
        return 0;
    }
    let mut quantity = (cash / unit_cost).floor() as u64;
    // The division can round up onto the next integer.
    while quantity > 0 && quantity as f64 * unit_cost > cash {
        quantity -= 1;
    }
    quantity
}

/// Sell every held ticker. Prices are all resolved before the ledger is
/// touched, so a resolution failure leaves it unchanged.
pub fn liquidate_all(
    ledger: &mut Ledger,
    prices: &PriceTable,
    date: NaiveDate,
    config: &ExecutionConfig,
) -> Result<Vec<Sale>, DualMomError> {
    let sales = ledger
        .held()
        .map(|holding| {
            let point = prices.as_of(&holding.ticker, date)?;
            Ok(Sale {
                ticker: holding.ticker.clone(),
                quantity: holding.quantity,
                price: point.price,
                proceeds: holding.quantity as f64 * point.price * (1.0 - config.sell_commission),
            })
        })
        .collect::<Result<Vec<_>, DualMomError>>()?;

    for sale in &sales {
        ledger.cash += sale.proceeds;
        ledger.set_quantity(&sale.ticker, 0);
    }
    Ok(sales)
}

pub fn acquire(
    ledger: &mut Ledger,
    prices: &PriceTable,
    ticker: &str,
    date: NaiveDate,
    config: &ExecutionConfig,
) -> Result<Purchase, DualMomError> {
    let price = prices.as_of(ticker, date)?.price;
    let unit_cost = price * (1.0 + config.buy_commission);
    let quantity = affordable_quantity(ledger.cash, unit_cost);

    if quantity == 0 {
        return Ok(Purchase::InsufficientFunds {
            ticker: ticker.to_string(),
            price,
        });
    }

    let cost = quantity as f64 * unit_cost;
    ledger.cash -= cost;
    ledger.set_quantity(ticker, ledger.quantity(ticker) + quantity);

    Ok(Purchase::Filled {
        ticker: ticker.to_string(),
        quantity,
        price,
        cost,
    })
}
