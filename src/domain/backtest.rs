//! Monthly rotation simulator.
//!
//! Each rebalancing step scores the universe, picks a regime and target,
//! fully liquidates, re-enters the target, values the ledger and appends an
//! immutable [`TradeRecord`]. Any as-of resolution failure aborts the run.

use chrono::{Months, NaiveDate};

use crate::domain::error::DualMomError;
use crate::domain::execution::{self, ExecutionConfig, Purchase};
use crate::domain::momentum::{score_universe, MAX_LOOKBACK_MONTHS};
use crate::domain::portfolio::{HoldingsSnapshot, Ledger};
use crate::domain::price_series::{PriceField, PriceSeries, PriceTable};
use crate::domain::strategy::{select_target, Regime};
use crate::domain::universe::Universe;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_cash: f64,
    pub buy_commission: f64,
    pub sell_commission: f64,
    pub price_field: PriceField,
}

impl BacktestConfig {
    pub fn execution(&self) -> ExecutionConfig {
        ExecutionConfig {
            buy_commission: self.buy_commission,
            sell_commission: self.sell_commission,
        }
    }

    /// First date to fetch so the longest lookback resolves on the first step.
    pub fn fetch_start(&self) -> NaiveDate {
        self.start_date
            .checked_sub_months(Months::new(MAX_LOOKBACK_MONTHS))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// One immutable history entry per rebalancing step.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub regime: Regime,
    pub ticker: String,
    pub cash: f64,
    pub total_value: f64,
    /// total_value / initial_cash − 1
    pub cumulative_return: f64,
    pub holdings: HoldingsSnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub records: Vec<TradeRecord>,
    pub initial_cash: f64,
    pub final_value: f64,
    pub annualized_return: f64,
}

/// `start`, `start + 1 month`, ... while on or before `end`.
///
/// Each date is the previous one plus a month, so a start on the 31st clamps
/// at the first short month and stays on the clamped day afterwards.
pub fn rebalance_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = Some(start);
    while let Some(date) = current {
        if date > end {
            break;
        }
        dates.push(date);
        current = date.checked_add_months(Months::new(1));
    }
    dates
}

/// (final / initial)^(12 / steps) − 1
pub fn annualized_return(initial_cash: f64, final_value: f64, steps: usize) -> f64 {
    if steps == 0 || initial_cash <= 0.0 {
        return 0.0;
    }
    (final_value / initial_cash).powf(12.0 / steps as f64) - 1.0
}

/// Fetch every universe ticker from twelve months before the start to the
/// end date. A failed fetch is fatal.
pub fn load_price_table(
    data_port: &dyn DataPort,
    universe: &Universe,
    config: &BacktestConfig,
) -> Result<PriceTable, DualMomError> {
    let fetch_start = config.fetch_start();
    let mut table = PriceTable::new();

    for ticker in universe.all_tickers() {
        let points =
            data_port.fetch_prices(ticker, fetch_start, config.end_date, config.price_field)?;
        let series = PriceSeries::new(ticker.clone(), points);
        tracing::info!(
            %ticker,
            observations = series.len(),
            first = ?series.first_date(),
            last = ?series.last_date(),
            "loaded price series"
        );
        table.insert(series);
    }

    Ok(table)
}

pub struct RotationSimulator<'a> {
    config: &'a BacktestConfig,
    universe: &'a Universe,
    prices: &'a PriceTable,
    ledger: Ledger,
    history: Vec<TradeRecord>,
}

impl<'a> RotationSimulator<'a> {
    pub fn new(config: &'a BacktestConfig, universe: &'a Universe, prices: &'a PriceTable) -> Self {
        Self {
            config,
            universe,
            prices,
            ledger: Ledger::new(config.initial_cash, universe),
            history: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn history(&self) -> &[TradeRecord] {
        &self.history
    }

    /// Run one rebalancing step on `date` and return the appended record.
    pub fn step(&mut self, date: NaiveDate) -> Result<&TradeRecord, DualMomError> {
        let scores = score_universe(self.prices, self.universe, date);
        let decision = select_target(self.universe, &scores);
        let exec = self.config.execution();

        // Always unwind fully, even when the target is unchanged.
        let sales = execution::liquidate_all(&mut self.ledger, self.prices, date, &exec)?;
        for sale in &sales {
            tracing::debug!(
                %date,
                ticker = %sale.ticker,
                quantity = sale.quantity,
                price = sale.price,
                proceeds = sale.proceeds,
                "sold"
            );
        }

        let purchase =
            execution::acquire(&mut self.ledger, self.prices, &decision.target, date, &exec)?;
        if let Purchase::InsufficientFunds { ticker, price } = &purchase {
            tracing::warn!(%date, %ticker, price, cash = self.ledger.cash, "insufficient cash for one unit");
        }

        let total_value = self.ledger.total_value(self.prices, date)?;
        let record = TradeRecord {
            date,
            regime: decision.regime,
            ticker: decision.target,
            cash: self.ledger.cash,
            total_value,
            cumulative_return: total_value / self.config.initial_cash - 1.0,
            holdings: self.ledger.snapshot(),
        };

        tracing::debug!(
            %date,
            regime = %record.regime,
            ticker = %record.ticker,
            quantity = purchase.quantity(),
            cash = record.cash,
            total_value = record.total_value,
            "rebalanced"
        );

        self.history.push(record);
        Ok(&self.history[self.history.len() - 1])
    }

    /// Step through every scheduled date and summarise.
    pub fn run(mut self) -> Result<BacktestResult, DualMomError> {
        let dates = rebalance_dates(self.config.start_date, self.config.end_date);
        if dates.is_empty() {
            return Err(DualMomError::EmptySchedule {
                start: self.config.start_date,
                end: self.config.end_date,
            });
        }

        tracing::info!(
            steps = dates.len(),
            start = %self.config.start_date,
            end = %self.config.end_date,
            "running rotation backtest"
        );

        for date in dates {
            self.step(date)?;
        }

        let final_value = self
            .history
            .last()
            .map(|r| r.total_value)
            .unwrap_or(self.config.initial_cash);
        let annualized =
            annualized_return(self.config.initial_cash, final_value, self.history.len());

        tracing::info!(final_value, annualized_return = annualized, "backtest complete");

        Ok(BacktestResult {
            records: self.history,
            initial_cash: self.config.initial_cash,
            final_value,
            annualized_return: annualized,
        })
    }
}

/// Convenience wrapper: build a simulator and run it to completion.
pub fn run_backtest(
    config: &BacktestConfig,
    universe: &Universe,
    prices: &PriceTable,
) -> Result<BacktestResult, DualMomError> {
    RotationSimulator::new(config, universe, prices).run()
}
