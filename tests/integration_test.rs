//! End-to-end rotation runs over a mock data port.

mod common;

use approx::assert_relative_eq;
use chrono::Datelike;
use common::*;
use dualmom::domain::backtest::{load_price_table, run_backtest, BacktestConfig, BacktestResult};
use dualmom::domain::error::DualMomError;
use dualmom::domain::metrics::Metrics;
use dualmom::domain::strategy::Regime;
use dualmom::domain::universe::Universe;
use proptest::prelude::*;

fn universe(risk: &[&str], safety: &[&str]) -> Universe {
    Universe::new(
        risk.iter().map(|s| s.to_string()).collect(),
        safety.iter().map(|s| s.to_string()).collect(),
    )
    .unwrap()
}

fn simulate(
    port: &MockDataPort,
    universe: &Universe,
    config: &BacktestConfig,
) -> Result<BacktestResult, DualMomError> {
    let prices = load_price_table(port, universe, config)?;
    run_backtest(config, universe, &prices)
}

/// Rises for two years, then loses 30% a month.
fn boom_then_bust() -> Vec<f64> {
    (0..30)
        .map(|i| {
            if i <= 23 {
                100.0 + 5.0 * i as f64
            } else {
                215.0 * 0.7_f64.powi(i - 23)
            }
        })
        .collect()
}

fn linear(start: f64, step: f64) -> Vec<f64> {
    (0..30).map(|i| start + step * i as f64).collect()
}

fn rotation_port() -> MockDataPort {
    MockDataPort::new()
        .with_points("EQ", monthly_points("2022-01-01", &boom_then_bust()))
        .with_points("EM", monthly_points("2022-01-01", &linear(200.0, -2.0)))
        .with_points("BND", monthly_points("2022-01-01", &[50.0; 30]))
        .with_points("TIP", monthly_points("2022-01-01", &linear(50.0, 0.1)))
}

mod rotation {
    use super::*;

    #[test]
    fn switches_from_growth_to_defensive_when_momentum_turns() {
        let universe = universe(&["EQ", "EM"], &["BND", "TIP"]);
        let config = make_config("2023-01-01", "2024-06-01");

        let result = simulate(&rotation_port(), &universe, &config).unwrap();

        assert_eq!(result.records.len(), 18);

        let first = &result.records[0];
        assert_eq!(first.regime, Regime::Risk);
        assert_eq!(first.ticker, "EQ");
        // 1,000,000 / (160 × 1.001) → 6243 units
        assert_eq!(first.holdings.quantity("EQ"), 6243);

        let last = result.records.last().unwrap();
        assert_eq!(last.regime, Regime::Safety);
        assert_eq!(last.ticker, "TIP");
        assert_eq!(last.holdings.quantity("EQ"), 0);

        let metrics = Metrics::compute(&result);
        assert!(metrics.target_changes >= 1);
        assert_eq!(metrics.risk_steps + metrics.safety_steps, 18);
    }

    #[test]
    fn every_step_holds_at_most_the_target() {
        let universe = universe(&["EQ", "EM"], &["BND", "TIP"]);
        let config = make_config("2023-01-01", "2024-06-01");
        let result = simulate(&rotation_port(), &universe, &config).unwrap();

        for record in &result.records {
            assert!(record.cash >= 0.0);
            assert!(record.holdings.held_count() <= 1);
            for holding in record.holdings.held() {
                assert_eq!(holding.ticker, record.ticker);
            }
        }
    }

    #[test]
    fn ticker_without_a_year_of_history_is_skipped_until_eligible() {
        let new_listing: Vec<f64> = (0..24).map(|i| 10.0 * 1.2_f64.powi(i)).collect();
        let steady: Vec<f64> = (0..33).map(|i| 100.0 + i as f64).collect();
        let port = MockDataPort::new()
            .with_points("NEW", monthly_points("2022-10-01", &new_listing))
            .with_points("OLD", monthly_points("2022-01-01", &steady))
            .with_points("SHY", monthly_points("2022-01-01", &[80.0; 33]));
        let universe = universe(&["NEW", "OLD"], &["SHY"]);
        let config = make_config("2023-01-01", "2024-01-01");

        let result = simulate(&port, &universe, &config).unwrap();
        assert_eq!(result.records.len(), 13);

        let switch = date("2023-10-01");
        for record in &result.records {
            assert_eq!(record.regime, Regime::Risk);
            if record.date < switch {
                assert_eq!(record.ticker, "OLD", "on {}", record.date);
            } else {
                assert_eq!(record.ticker, "NEW", "on {}", record.date);
            }
        }
    }

    #[test]
    fn rerunning_gives_identical_history() {
        let universe = universe(&["EQ", "EM"], &["BND", "TIP"]);
        let config = make_config("2023-01-01", "2024-06-01");
        let port = rotation_port();

        let first = simulate(&port, &universe, &config).unwrap();
        let second = simulate(&port, &universe, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn daily_data_resolves_weekend_rebalance_dates() {
        // 2023-04-01 is a Saturday; weekends carry no observation.
        let points: Vec<PricePoint> = daily_points("2022-01-01", 600, |i| 100.0 + 0.1 * i as f64)
            .into_iter()
            .filter(|p| p.date.weekday().number_from_monday() <= 5)
            .collect();
        let port = MockDataPort::new()
            .with_points("SPY", points.clone())
            .with_points("SHY", points.iter().map(|p| PricePoint::new(p.date, 50.0)).collect());
        let universe = universe(&["SPY"], &["SHY"]);

        let config = make_config("2023-04-01", "2023-06-01");
        let result = simulate(&port, &universe, &config).unwrap();

        assert_eq!(result.records.len(), 3);
        assert_eq!(result.records[0].date, date("2023-04-01"));
        assert_eq!(result.records[0].ticker, "SPY");
    }
}

mod failures {
    use super::*;

    #[test]
    fn fetch_error_is_fatal() {
        let port = rotation_port().with_error("BND", "connection reset");
        let universe = universe(&["EQ"], &["BND"]);
        let config = make_config("2023-01-01", "2023-06-01");

        let err = simulate(&port, &universe, &config).unwrap_err();
        assert!(matches!(err, DualMomError::Data { ref reason } if reason == "connection reset"));
    }

    #[test]
    fn target_without_any_prior_price_aborts() {
        // Every score is ineligible, so the first safety ticker is targeted,
        // and it has nothing on or before the first date.
        let port = MockDataPort::new()
            .with_points("LATE", monthly_points("2023-06-01", &[10.0; 6]))
            .with_points("ALSO", monthly_points("2023-06-01", &[10.0; 6]));
        let universe = universe(&["ALSO"], &["LATE"]);

        let config = make_config("2023-01-01", "2023-08-01");

        let err = simulate(&port, &universe, &config).unwrap_err();
        match err {
            DualMomError::NoPriorObservation { ticker, date: on } => {
                assert_eq!(ticker, "LATE");
                assert_eq!(on, date("2023-01-01"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn start_after_end_is_an_empty_schedule() {
        let universe = universe(&["EQ"], &["BND"]);
        let config = make_config("2024-01-01", "2023-01-01");
        let err = simulate(&rotation_port(), &universe, &config).unwrap_err();
        assert!(matches!(err, DualMomError::EmptySchedule { .. }));
    }
}

mod commissions {
    use super::*;

    #[test]
    fn zero_commission_preserves_value_at_constant_prices() {
        let port = MockDataPort::new()
            .with_points("A", monthly_points("2022-01-01", &[37.0; 30]))
            .with_points("B", monthly_points("2022-01-01", &[11.0; 30]));
        let universe = universe(&["A"], &["B"]);
        let config = BacktestConfig {
            buy_commission: 0.0,
            sell_commission: 0.0,
            ..make_config("2023-01-01", "2024-01-01")
        };

        let result = simulate(&port, &universe, &config).unwrap();
        for record in &result.records {
            assert_relative_eq!(record.total_value, 1_000_000.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn commissions_erode_value_at_constant_prices() {
        let port = MockDataPort::new()
            .with_points("A", monthly_points("2022-01-01", &[37.0; 30]))
            .with_points("B", monthly_points("2022-01-01", &[11.0; 30]));
        let universe = universe(&["A"], &["B"]);
        let config = make_config("2023-01-01", "2024-01-01");
        let result = simulate(&port, &universe, &config).unwrap();

        let values: Vec<f64> = result.records.iter().map(|r| r.total_value).collect();
        assert!(values.windows(2).all(|w| w[1] < w[0]));
    }
}

fn price_path() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..500.0, 25)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ledger_invariants_hold_on_random_paths(
        a in price_path(),
        b in price_path(),
        c in price_path(),
        buy in 0.0f64..0.999,
        sell in 0.0f64..0.999,
        cash in 100.0f64..1_000_000.0,
    ) {
        let port = MockDataPort::new()
            .with_points("A", monthly_points("2022-01-01", &a))
            .with_points("B", monthly_points("2022-01-01", &b))
            .with_points("C", monthly_points("2022-01-01", &c));
        let universe = universe(&["A", "B"], &["C"]);
        let config = BacktestConfig {
            initial_cash: cash,
            buy_commission: buy,
            sell_commission: sell,
            ..make_config("2023-01-01", "2024-01-01")
        };
        let prices = load_price_table(&port, &universe, &config).unwrap();
        let result = run_backtest(&config, &universe, &prices).unwrap();

        prop_assert_eq!(result.records.len(), 13);
        for record in &result.records {
            prop_assert!(record.cash >= 0.0);
            prop_assert!(record.holdings.held_count() <= 1);
            let class_tickers = match record.regime {
                Regime::Risk => universe.risk(),
                Regime::Safety => universe.safety(),
            };
            prop_assert!(class_tickers.contains(&record.ticker));

            let held_value: f64 = record
                .holdings
                .held()
                .map(|h| h.quantity as f64 * prices.as_of(&h.ticker, record.date).unwrap().price)
                .sum();
            let recomputed = record.cash + held_value;
            let tolerance = 1e-9 * record.total_value.max(1.0);
            prop_assert!((recomputed - record.total_value).abs() <= tolerance);
        }
    }
}
