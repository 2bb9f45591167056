//! Domain error types.

use chrono::NaiveDate;

use super::universe::{AssetClass, UniverseError};

/// Top-level error type for dualmom.
#[derive(Debug, thiserror::Error)]
pub enum DualMomError {
    #[error("no observation for {ticker} on or before {date}")]
    NoPriorObservation { ticker: String, date: NaiveDate },

    #[error("{class} universe has no tickers")]
    EmptyUniverse { class: AssetClass },

    #[error("no rebalancing dates between {start} and {end}")]
    EmptySchedule { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&DualMomError> for std::process::ExitCode {
    fn from(err: &DualMomError) -> Self {
        let code: u8 = match err {
            DualMomError::Io(_) | DualMomError::Report { .. } => 1,
            DualMomError::ConfigParse { .. }
            | DualMomError::ConfigMissing { .. }
            | DualMomError::ConfigInvalid { .. }
            | DualMomError::Universe(_)
            | DualMomError::EmptyUniverse { .. }
            | DualMomError::EmptySchedule { .. } => 2,
            DualMomError::Data { .. } => 3,
            DualMomError::NoPriorObservation { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_prior_observation_message_names_ticker_and_date() {
        let err = DualMomError::NoPriorObservation {
            ticker: "SPY".into(),
            date: NaiveDate::from_ymd_opt(2020, 1, 31).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "no observation for SPY on or before 2020-01-31"
        );
    }

    #[test]
    fn empty_universe_message() {
        let err = DualMomError::EmptyUniverse {
            class: AssetClass::Safety,
        };
        assert_eq!(err.to_string(), "safety universe has no tickers");
    }

    #[test]
    fn universe_error_is_transparent() {
        let err = DualMomError::from(UniverseError::DuplicateTicker("SPY".into()));
        assert_eq!(err.to_string(), "duplicate ticker: SPY");
    }
}
