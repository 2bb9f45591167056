//! Summary statistics over a finished rotation history.

use super::backtest::{annualized_return, BacktestResult, TradeRecord};
use super::strategy::Regime;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub steps: usize,
    pub risk_steps: usize,
    pub safety_steps: usize,
    pub target_changes: usize,
}

impl Metrics {
    pub fn compute(result: &BacktestResult) -> Self {
        let records = &result.records;
        let initial_cash = result.initial_cash;

        let final_value = records
            .last()
            .map(|r| r.total_value)
            .unwrap_or(initial_cash);

        let total_return = if initial_cash > 0.0 {
            (final_value - initial_cash) / initial_cash
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(initial_cash, records);

        let risk_steps = records.iter().filter(|r| r.regime == Regime::Risk).count();
        let target_changes = records
            .windows(2)
            .filter(|w| w[0].ticker != w[1].ticker)
            .count();

        Metrics {
            total_return,
            annualized_return: annualized_return(initial_cash, final_value, records.len()),
            max_drawdown,
            max_drawdown_duration,
            steps: records.len(),
            risk_steps,
            safety_steps: records.len() - risk_steps,
            target_changes,
        }
    }
}

/// Largest peak-to-trough fall (fraction of peak) and the longest run of
/// steps spent below a prior peak. The initial cash is the first peak.
fn compute_drawdown(initial_cash: f64, records: &[TradeRecord]) -> (f64, usize) {
    let mut peak = initial_cash;
    let mut max_dd = 0.0_f64;
    let mut current_duration = 0usize;
    let mut max_duration = 0usize;

    for record in records {
        if record.total_value >= peak {
            peak = record.total_value;
            current_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - record.total_value) / peak;
            max_dd = max_dd.max(dd);
            current_duration += 1;
            max_duration = max_duration.max(current_duration);
        }
    }

    (max_dd, max_duration)
}
