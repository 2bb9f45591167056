//! Price data provider port.

use crate::domain::error::DualMomError;
use crate::domain::price_series::{PriceField, PricePoint};
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily `field` prices for `ticker` within `[start_date, end_date]`.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        field: PriceField,
    ) -> Result<Vec<PricePoint>, DualMomError>;

    fn list_tickers(&self) -> Result<Vec<String>, DualMomError>;

    /// First date, last date and observation count, or `None` without data.
    fn get_data_range(
        &self,
        ticker: &str,
        field: PriceField,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, DualMomError>;
}
