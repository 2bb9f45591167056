//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart_adapter::SvgChartAdapter;
use crate::domain::backtest::{
    self as backtest_engine, rebalance_dates, BacktestConfig, BacktestResult,
};
use crate::domain::config_validation::{
    parse_date, universe_from_config, validate_backtest_config,
};
use crate::domain::error::DualMomError;
use crate::domain::execution::ExecutionConfig;
use crate::domain::metrics::Metrics;
use crate::domain::price_series::PriceField;
use crate::domain::universe::{AssetClass, Universe};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_INITIAL_CASH: f64 = 1_000_000.0;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CSV_PATH: &str = "simulation_results.csv";
pub const DEFAULT_CHART_PATH: &str = "simulation_results.svg";

#[derive(Parser, Debug)]
#[command(name = "dualmom", about = "Monthly dual-momentum rotation backtester")]
pub struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a rotation backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Tabular export path (overrides [report] csv_path)
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Chart path (overrides [report] chart_path)
        #[arg(long)]
        chart: Option<PathBuf>,
        /// Price CSV directory (overrides [data] directory)
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a backtest configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for the universe tickers
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        /// Every CSV in the data directory, not just the universe
        #[arg(long, conflicts_with = "ticker")]
        all: bool,
    },
}

/// Install the stderr subscriber. `RUST_LOG` wins unless `verbose` is set.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            csv,
            chart,
            data_dir,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, data_dir.as_ref())
            } else {
                run_backtest(&config, csv.as_ref(), chart.as_ref(), data_dir.as_ref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Info {
            config,
            ticker,
            all,
        } => run_info(&config, ticker.as_deref(), all),
    }
}

fn fail(err: &DualMomError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

/// Load and validate, then build the run parameters.
fn load_validated(
    config_path: &Path,
) -> Result<(FileConfigAdapter, BacktestConfig, Universe), ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter).map_err(|e| fail(&e))?;
    let bt_config = build_backtest_config(&adapter).map_err(|e| fail(&e))?;
    let universe = universe_from_config(&adapter).map_err(|e| fail(&e))?;
    Ok((adapter, bt_config, universe))
}

fn run_backtest(
    config_path: &Path,
    csv_override: Option<&PathBuf>,
    chart_override: Option<&PathBuf>,
    data_dir_override: Option<&PathBuf>,
) -> ExitCode {
    let (adapter, bt_config, universe) = match load_validated(config_path) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let data_dir = resolve_data_dir(&adapter, data_dir_override);
    let outputs = ReportPaths::resolve(&adapter, csv_override, chart_override);

    eprintln!("Reading prices from {}", data_dir.display());
    let data_port = CsvAdapter::new(data_dir);

    run_backtest_pipeline(&data_port, &bt_config, &universe, &outputs)
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, DualMomError> {
    let start_str = adapter.get_string("backtest", "start_date");
    let end_str = adapter.get_string("backtest", "end_date");
    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    let price_field = match adapter.get_string("backtest", "price_field") {
        Some(raw) => raw
            .parse::<PriceField>()
            .map_err(|reason| DualMomError::ConfigInvalid {
                section: "backtest".into(),
                key: "price_field".into(),
                reason,
            })?,
        None => PriceField::default(),
    };

    let commissions = ExecutionConfig::default();
    Ok(BacktestConfig {
        start_date,
        end_date,
        initial_cash: adapter.get_double("backtest", "initial_cash", DEFAULT_INITIAL_CASH),
        buy_commission: adapter.get_double(
            "backtest",
            "buy_commission",
            commissions.buy_commission,
        ),
        sell_commission: adapter.get_double(
            "backtest",
            "sell_commission",
            commissions.sell_commission,
        ),
        price_field,
    })
}

pub fn resolve_data_dir(adapter: &dyn ConfigPort, override_dir: Option<&PathBuf>) -> PathBuf {
    override_dir.cloned().unwrap_or_else(|| {
        adapter
            .get_string("data", "directory")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    })
}

/// Where the tabular export and the chart are written.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub chart: PathBuf,
}

impl ReportPaths {
    /// Command-line override, then `[report]`, then the default file name.
    pub fn resolve(
        adapter: &dyn ConfigPort,
        csv_override: Option<&PathBuf>,
        chart_override: Option<&PathBuf>,
    ) -> Self {
        let pick = |over: Option<&PathBuf>, key: &str, default: &str| {
            over.cloned().unwrap_or_else(|| {
                adapter
                    .get_string("report", key)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(default))
            })
        };
        Self {
            csv: pick(csv_override, "csv_path", DEFAULT_CSV_PATH),
            chart: pick(chart_override, "chart_path", DEFAULT_CHART_PATH),
        }
    }
}

/// Load prices, simulate, write both reports. Returns the finished run.
pub fn execute_backtest(
    data_port: &dyn DataPort,
    bt_config: &BacktestConfig,
    universe: &Universe,
    outputs: &ReportPaths,
) -> Result<(BacktestResult, Metrics), DualMomError> {
    let prices = backtest_engine::load_price_table(data_port, universe, bt_config)?;
    let result = backtest_engine::run_backtest(bt_config, universe, &prices)?;
    let metrics = Metrics::compute(&result);

    CsvReportAdapter::new().write(&result, universe, &outputs.csv)?;
    SvgChartAdapter::new().write(&result, universe, &outputs.chart)?;

    Ok((result, metrics))
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    bt_config: &BacktestConfig,
    universe: &Universe,
    outputs: &ReportPaths,
) -> ExitCode {
    eprintln!(
        "Running backtest: {} tickers ({} risk / {} safety), {} to {}",
        universe.count(),
        universe.risk().len(),
        universe.safety().len(),
        bt_config.start_date,
        bt_config.end_date,
    );

    let (result, metrics) = match execute_backtest(data_port, bt_config, universe, outputs) {
        Ok(done) => done,
        Err(e) => return fail(&e),
    };

    print_summary(&result, &metrics);
    eprintln!("\nResults written to: {}", outputs.csv.display());
    eprintln!("Chart written to:   {}", outputs.chart.display());
    ExitCode::SUCCESS
}

fn print_summary(result: &BacktestResult, metrics: &Metrics) {
    eprintln!("\n=== Rotation Results ===");
    eprintln!("Initial Cash:     {:.2}", result.initial_cash);
    eprintln!("Final Value:      {:.2}", result.final_value);
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!(
        "Annualized:       {:.2}%",
        metrics.annualized_return * 100.0
    );
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!("Steps:            {}", metrics.steps);
    eprintln!(
        "Regime Split:     {} risk / {} safety",
        metrics.risk_steps, metrics.safety_steps
    );
    eprintln!("Target Changes:   {}", metrics.target_changes);

    if let Some(last) = result.records.last() {
        eprintln!("Final Holding:    {} ({})", last.ticker, last.regime);
    }
}

/// Everything a backtest would use, resolved without loading any prices.
#[derive(Debug, Clone, PartialEq)]
pub struct DryRunPlan {
    pub config: BacktestConfig,
    pub universe: Universe,
    pub data_dir: PathBuf,
    pub schedule: Vec<NaiveDate>,
}

impl DryRunPlan {
    pub fn resolve(
        adapter: &dyn ConfigPort,
        data_dir_override: Option<&PathBuf>,
    ) -> Result<Self, DualMomError> {
        validate_backtest_config(adapter)?;
        let config = build_backtest_config(adapter)?;
        let universe = universe_from_config(adapter)?;
        let schedule = rebalance_dates(config.start_date, config.end_date);
        Ok(Self {
            config,
            universe,
            data_dir: resolve_data_dir(adapter, data_dir_override),
            schedule,
        })
    }
}

pub fn run_dry_run(config_path: &Path, data_dir_override: Option<&PathBuf>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let plan = match DryRunPlan::resolve(&adapter, data_dir_override) {
        Ok(plan) => plan,
        Err(e) => return fail(&e),
    };
    eprintln!("Config validated successfully");

    let bt_config = &plan.config;
    eprintln!("\nBacktest:");
    eprintln!("  period:          {} to {}", bt_config.start_date, bt_config.end_date);
    eprintln!("  initial cash:    {:.2}", bt_config.initial_cash);
    eprintln!("  buy commission:  {}", bt_config.buy_commission);
    eprintln!("  sell commission: {}", bt_config.sell_commission);
    eprintln!("  price field:     {}", bt_config.price_field);
    eprintln!("  fetch from:      {}", bt_config.fetch_start());

    eprintln!("\nUniverse:");
    for class in [AssetClass::Risk, AssetClass::Safety] {
        eprintln!("  {:<7} {}", format!("{class}:"), plan.universe.tickers(class).join(", "));
    }
    eprintln!("  data:   {}", plan.data_dir.display());

    eprintln!("\nSchedule: {} rebalancing dates", plan.schedule.len());
    for date in &plan.schedule {
        eprintln!("  {}", date);
    }

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(config_path: &Path, ticker: Option<&str>, all: bool) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let field = match config.get_string("backtest", "price_field") {
        Some(raw) => match raw.parse::<PriceField>() {
            Ok(f) => f,
            Err(reason) => {
                return fail(&DualMomError::ConfigInvalid {
                    section: "backtest".into(),
                    key: "price_field".into(),
                    reason,
                })
            }
        },
        None => PriceField::default(),
    };

    let adapter = CsvAdapter::new(resolve_data_dir(&config, None));

    let tickers: Vec<String> = match (ticker, all) {
        (Some(t), _) => vec![t.trim().to_uppercase()],
        (None, true) => match adapter.list_tickers() {
            Ok(found) => found,
            Err(e) => return fail(&e),
        },
        (None, false) => match universe_from_config(&config) {
            Ok(universe) => universe.all_tickers().cloned().collect(),
            Err(e) => return fail(&e),
        },
    };

    if tickers.is_empty() {
        eprintln!("No price files found");
    }
    print_data_ranges(&adapter, &tickers, field);
    ExitCode::SUCCESS
}

pub fn print_data_ranges(data_port: &dyn DataPort, tickers: &[String], field: PriceField) {
    for ticker in tickers {
        match data_port.get_data_range(ticker, field) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} observations, {} to {}", ticker, count, min_date, max_date);
            }
            Ok(None) => {
                eprintln!("{}: no data found", ticker);
            }
            Err(e) => {
                eprintln!("error querying {}: {}", ticker, e);
            }
        }
    }
}
