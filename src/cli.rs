//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    DEFAULT_INITIAL_INVESTMENT, DEFAULT_INTERVAL, DEFAULT_PERIOD, parse_spans,
    validate_backtest_config, validate_backtest_params,
};
use crate::domain::error::BacktestError;
use crate::domain::indicator::DEFAULT_SPANS;
use crate::domain::metrics::Summary;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::period::{Interval, Lookback};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceSeriesSource;
use crate::ports::report_port::ReportPort;

const DEFAULT_DATA_PATH: &str = "data";
const DEFAULT_OUTPUT: &str = "results.csv";

#[derive(Parser, Debug)]
#[command(name = "emacross", about = "EMA-ordering strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and export the result table
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, symbol.as_deref())
            } else {
                run_backtest(&config, symbol.as_deref(), output.as_deref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

fn fail(err: BacktestError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BacktestError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Builds a typed config. Expects `validate_backtest_config` to have passed,
/// but reports any field it cannot parse rather than assuming so.
pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<BacktestConfig, BacktestError> {
    let symbol = match symbol_override {
        Some(s) => s.trim().to_uppercase(),
        None => adapter
            .get_string("backtest", "symbol")
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BacktestError::ConfigMissing {
                section: "backtest".into(),
                key: "symbol".into(),
            })?,
    };

    let period = Lookback::parse(
        &adapter
            .get_string("backtest", "period")
            .unwrap_or_else(|| DEFAULT_PERIOD.to_string()),
    )?;
    let interval = Interval::parse(
        &adapter
            .get_string("backtest", "interval")
            .unwrap_or_else(|| DEFAULT_INTERVAL.to_string()),
    )?;
    let spans = match adapter.get_list("backtest", "spans") {
        Some(tokens) => parse_spans(&tokens)?,
        None => DEFAULT_SPANS.to_vec(),
    };

    Ok(BacktestConfig {
        symbol,
        period,
        interval,
        spans,
        initial_investment: adapter.get_double(
            "backtest",
            "initial_investment",
            DEFAULT_INITIAL_INVESTMENT,
        ),
        reverse: adapter.get_bool("backtest", "reverse", false),
    })
}

pub fn resolve_output(output_override: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    output_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("report", "output").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

pub fn resolve_data_path(config: &dyn ConfigPort) -> PathBuf {
    config
        .get_string("data", "path")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
}

/// Loads and validates the file, then builds the typed config.
fn prepare(
    config_path: &Path,
    symbol_override: Option<&str>,
) -> Result<(FileConfigAdapter, BacktestConfig), BacktestError> {
    let adapter = load_config(config_path)?;
    match symbol_override {
        Some(_) => validate_backtest_params(&adapter)?,
        None => validate_backtest_config(&adapter)?,
    }
    let config = build_backtest_config(&adapter, symbol_override)?;
    Ok((adapter, config))
}

fn run_backtest(
    config_path: &Path,
    symbol_override: Option<&str>,
    output_override: Option<&Path>,
) -> ExitCode {
    let (adapter, config) = match prepare(config_path, symbol_override) {
        Ok(v) => v,
        Err(e) => return fail(e),
    };

    let source = CsvAdapter::new(resolve_data_path(&adapter));
    let output = resolve_output(output_override, &adapter);

    match run_backtest_pipeline(&source, &CsvReportAdapter::new(), &config, &output) {
        Ok(result) => {
            print_summary(&result);
            eprintln!("\nResults written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

/// Fetch, compute and export. Source errors propagate unchanged.
pub fn run_backtest_pipeline(
    source: &dyn PriceSeriesSource,
    report: &dyn ReportPort,
    config: &BacktestConfig,
    output: &Path,
) -> Result<BacktestResult, BacktestError> {
    info!(
        symbol = %config.symbol,
        period = %config.period,
        interval = %config.interval,
        "fetching price history"
    );
    let bars = source.fetch_history(&config.symbol, config.period, config.interval)?;
    if bars.is_empty() {
        warn!(symbol = %config.symbol, "source returned no bars");
    }
    let series = PriceSeries::new(config.symbol.clone(), bars)?;

    let result = backtest_engine::run_backtest(&series, config)?;
    report.write(&result, output)?;
    Ok(result)
}

pub fn print_summary(result: &BacktestResult) {
    let summary = Summary::compute(result);
    let (first, last) = match (result.bars.first(), result.bars.last()) {
        (Some(f), Some(l)) => (f.date, l.date),
        _ => return,
    };

    eprintln!("\n=== {} ({} to {}, {} bars) ===", result.symbol, first, last, result.len());
    eprintln!("Initial Investment: {:.2}", result.initial_investment);
    eprintln!("\n                 Buy & Hold    Strategy");
    eprintln!(
        "Final Value:      {:>10.2}  {:>10.2}",
        summary.passive.final_value, summary.strategy.final_value
    );
    eprintln!(
        "Total Return:     {:>9.2}%  {:>9.2}%",
        summary.passive.total_return * 100.0,
        summary.strategy.total_return * 100.0
    );
    eprintln!(
        "Annualized:       {:>9.2}%  {:>9.2}%",
        summary.passive.annualized_return * 100.0,
        summary.strategy.annualized_return * 100.0
    );
    eprintln!(
        "Max Drawdown:     {:>9.1}%  {:>9.1}%",
        -summary.passive.max_drawdown * 100.0,
        -summary.strategy.max_drawdown * 100.0
    );
    eprintln!(
        "\nTrend steps: {} up, {} down, {} mixed ({:.1}% invested)",
        summary.uptrend_steps,
        summary.downtrend_steps,
        summary.mixed_steps,
        summary.exposure() * 100.0
    );
}

pub fn run_dry_run(config_path: &Path, symbol_override: Option<&str>) -> ExitCode {
    let (adapter, config) = match prepare(config_path, symbol_override) {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    eprintln!("Config validated successfully");

    let spans: Vec<String> = config.spans.iter().map(|s| s.to_string()).collect();
    eprintln!("\nBacktest parameters:");
    eprintln!("  symbol:             {}", config.symbol);
    eprintln!("  period:             {}", config.period);
    eprintln!("  interval:           {}", config.interval);
    eprintln!("  spans:              {}", spans.join(", "));
    eprintln!("  initial_investment: {:.2}", config.initial_investment);
    if config.reverse {
        eprintln!("  reverse:            true (reserved, has no effect)");
    }
    eprintln!("  data path:          {}", resolve_data_path(&adapter).display());
    eprintln!("  output:             {}", resolve_output(None, &adapter).display());

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    match prepare(config_path, None) {
        Ok((_, config)) => {
            eprintln!("Configuration for {} is valid.", config.symbol);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(e),
    };
    let source = CsvAdapter::new(resolve_data_path(&adapter));

    let symbols = match source.list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}
