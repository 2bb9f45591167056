//! Risk/safety asset universe.
//!
//! Ticker lists are parsed from configuration into an immutable [`Universe`]
//! that the simulator receives at construction time.

use std::collections::HashSet;
use std::fmt;

use crate::domain::error::DualMomError;

pub const DEFAULT_RISK_TICKERS: &[&str] = &["SPY", "EFA", "EEM", "AGG", "QQQ"];
pub const DEFAULT_SAFETY_TICKERS: &[&str] = &["LQD", "IEF", "SHY"];

/// Which side of the universe a ticker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Risk,
    Safety,
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetClass::Risk => write!(f, "risk"),
            AssetClass::Safety => write!(f, "safety"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),

    #[error("ticker {0} is listed as both a risk and a safety asset")]
    OverlappingTicker(String),
}

/// Ordered risk and safety ticker sets. Declared order is significant: it
/// breaks ties during selection and orders report columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    risk: Vec<String>,
    safety: Vec<String>,
}

impl Universe {
    pub fn new(risk: Vec<String>, safety: Vec<String>) -> Result<Self, DualMomError> {
        if risk.is_empty() {
            return Err(DualMomError::EmptyUniverse {
                class: AssetClass::Risk,
            });
        }
        if safety.is_empty() {
            return Err(DualMomError::EmptyUniverse {
                class: AssetClass::Safety,
            });
        }

        let mut seen = HashSet::new();
        for ticker in &risk {
            if !seen.insert(ticker.as_str()) {
                return Err(UniverseError::DuplicateTicker(ticker.clone()).into());
            }
        }
        let mut seen_safety = HashSet::new();
        for ticker in &safety {
            if !seen_safety.insert(ticker.as_str()) {
                return Err(UniverseError::DuplicateTicker(ticker.clone()).into());
            }
            if seen.contains(ticker.as_str()) {
                return Err(UniverseError::OverlappingTicker(ticker.clone()).into());
            }
        }

        Ok(Self { risk, safety })
    }

    /// The classic dual-momentum set: five risk ETFs and three bond ETFs.
    pub fn default_etfs() -> Self {
        Self {
            risk: DEFAULT_RISK_TICKERS.iter().map(|s| s.to_string()).collect(),
            safety: DEFAULT_SAFETY_TICKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn risk(&self) -> &[String] {
        &self.risk
    }

    pub fn safety(&self) -> &[String] {
        &self.safety
    }

    pub fn tickers(&self, class: AssetClass) -> &[String] {
        match class {
            AssetClass::Risk => &self.risk,
            AssetClass::Safety => &self.safety,
        }
    }

    /// Risk tickers followed by safety tickers, each in declared order.
    pub fn all_tickers(&self) -> impl Iterator<Item = &String> {
        self.risk.iter().chain(self.safety.iter())
    }

    pub fn count(&self) -> usize {
        self.risk.len() + self.safety.len()
    }
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}
