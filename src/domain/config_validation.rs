//! Configuration validation.
//!
//! Validates every backtest field before any data is loaded.

use crate::domain::error::DualMomError;
use crate::domain::price_series::PriceField;
use crate::domain::universe::{parse_tickers, Universe};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), DualMomError> {
    validate_initial_cash(config)?;
    validate_commission(config, "buy_commission")?;
    validate_commission(config, "sell_commission")?;
    validate_price_field(config)?;
    validate_dates(config)?;
    validate_universe(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> DualMomError {
    DualMomError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// `Ok(None)` when absent; an error when present but not a number.
fn optional_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, DualMomError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("'{raw}' is not a number"))),
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), DualMomError> {
    if let Some(value) = optional_number(config, "backtest", "initial_cash")? {
        if !(value.is_finite() && value > 0.0) {
            return Err(invalid("backtest", "initial_cash", "initial_cash must be positive"));
        }
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort, key: &str) -> Result<(), DualMomError> {
    if let Some(value) = optional_number(config, "backtest", key)? {
        if !(0.0..1.0).contains(&value) {
            return Err(invalid("backtest", key, format!("{key} must be in [0, 1)")));
        }
    }
    Ok(())
}

fn validate_price_field(config: &dyn ConfigPort) -> Result<(), DualMomError> {
    if let Some(raw) = config.get_string("backtest", "price_field") {
        raw.parse::<PriceField>()
            .map_err(|reason| invalid("backtest", "price_field", reason))?;
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), DualMomError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date > end_date {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, DualMomError> {
    match value {
        None => Err(DualMomError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                "backtest",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn validate_universe(config: &dyn ConfigPort) -> Result<(), DualMomError> {
    universe_from_config(config).map(|_| ())
}

/// Build the universe from `[universe] risk` / `safety`, falling back to the
/// default ETF lists for a missing key.
pub fn universe_from_config(config: &dyn ConfigPort) -> Result<Universe, DualMomError> {
    let defaults = Universe::default_etfs();

    let risk = match config.get_string("universe", "risk") {
        Some(raw) if raw.trim().is_empty() => Vec::new(),
        Some(raw) => parse_tickers(&raw)?,
        None => defaults.risk().to_vec(),
    };
    let safety = match config.get_string("universe", "safety") {
        Some(raw) if raw.trim().is_empty() => Vec::new(),
        Some(raw) => parse_tickers(&raw)?,
        None => defaults.safety().to_vec(),
    };

    Universe::new(risk, safety)
}
