//! Dual-momentum regime decision and asset selection.

use std::fmt;

use crate::domain::momentum::{MomentumScore, ScoreMap};
use crate::domain::universe::{AssetClass, Universe};

/// Growth (`Risk`) or defensive (`Safety`) stance for one rebalancing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    Risk,
    Safety,
}

impl Regime {
    pub fn asset_class(&self) -> AssetClass {
        match self {
            Regime::Risk => AssetClass::Risk,
            Regime::Safety => AssetClass::Safety,
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regime::Risk => write!(f, "risk"),
            Regime::Safety => write!(f, "safety"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub regime: Regime,
    pub target: String,
    pub best_risk: String,
    pub best_safety: String,
}

/// Highest-scoring ticker in declared order. The first of equal scores wins,
/// including when every candidate is ineligible.
pub fn best_of<'a>(tickers: &'a [String], scores: &ScoreMap) -> Option<&'a String> {
    let mut best: Option<(&String, MomentumScore)> = None;
    for ticker in tickers {
        let score = score_for(scores, ticker);
        match best {
            Some((_, current)) if score <= current => {}
            _ => best = Some((ticker, score)),
        }
    }
    best.map(|(ticker, _)| ticker)
}

/// Safety regime iff no risk asset has a strictly positive score.
pub fn regime_for(universe: &Universe, scores: &ScoreMap) -> Regime {
    if universe
        .risk()
        .iter()
        .any(|ticker| score_for(scores, ticker).is_positive())
    {
        Regime::Risk
    } else {
        Regime::Safety
    }
}

pub fn select_target(universe: &Universe, scores: &ScoreMap) -> Decision {
    // Universe construction guarantees both sets are non-empty.
    let best_risk = best_of(universe.risk(), scores)
        .cloned()
        .unwrap_or_default();
    let best_safety = best_of(universe.safety(), scores)
        .cloned()
        .unwrap_or_default();

    let regime = regime_for(universe, scores);
    let target = best_of(universe.tickers(regime.asset_class()), scores)
        .cloned()
        .unwrap_or_default();

    Decision {
        regime,
        target,
        best_risk,
        best_safety,
    }
}

fn score_for(scores: &ScoreMap, ticker: &str) -> MomentumScore {
    scores
        .get(ticker)
        .copied()
        .unwrap_or(MomentumScore::Ineligible)
}
