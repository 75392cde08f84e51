//! CLI definition and dispatch.

pub mod prompt;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::csv_trade_log_adapter::CsvTradeLogAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart_adapter::SvgChartAdapter;
use crate::domain::backtest::{
    run_backtest, CrossoverParams, DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW,
};
use crate::domain::config_validation::{parse_date, validate_backtest_config};
use crate::domain::error::SmaCrossError;
use crate::domain::portfolio::DEFAULT_INITIAL_CASH;
use crate::logging::{init_tracing, LogFormat};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceSource;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_CODE: &str = "XOM";
pub const DEFAULT_START_DATE: &str = "2019-01-01";
pub const DEFAULT_END_DATE: &str = "2025-05-20";
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "smacross", about = "Moving-average crossover backtester")]
pub struct Cli {
    /// Log filter (overridden by SMACROSS_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// Log output format: text or json
    #[arg(long, global = true)]
    pub log_format: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest(BacktestArgs),
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List codes available in a price directory
    ListCodes {
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct BacktestArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long)]
    pub short_window: Option<i64>,
    #[arg(long)]
    pub long_window: Option<i64>,
    #[arg(long)]
    pub initial_cash: Option<f64>,
    /// Write an SVG chart to this path
    #[arg(long)]
    pub chart: Option<PathBuf>,
    /// Write the trade log as CSV to this path
    #[arg(long)]
    pub trades: Option<PathBuf>,
    /// Prompt for ticker, dates and windows on the terminal
    #[arg(short, long)]
    pub interactive: bool,
}

/// Fully resolved inputs for one run: flags over config over defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub params: CrossoverParams,
    pub data_dir: PathBuf,
    pub chart_path: Option<PathBuf>,
    pub trades_path: Option<PathBuf>,
    pub print_trades: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    let config_path = match &cli.command {
        Command::Backtest(args) => args.config.clone(),
        Command::Validate { config } => Some(config.clone()),
        Command::ListCodes { config, .. } => config.clone(),
    };
    let config = match config_path.as_ref().map(load_config).transpose() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    if let Err(e) = setup_logging(&cli, config.as_ref()) {
        eprintln!("error: {e}");
        return ExitCode::from(&e);
    }

    let result = match cli.command {
        Command::Backtest(args) => run_backtest_command(args, config.as_ref()),
        Command::Validate { config: path } => match config.as_ref() {
            Some(c) => run_validate(&path, c),
            None => Ok(()),
        },
        Command::ListCodes { data_dir, .. } => run_list_codes(data_dir, config.as_ref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn setup_logging(cli: &Cli, config: Option<&FileConfigAdapter>) -> Result<(), SmaCrossError> {
    let level = cli
        .log_level
        .clone()
        .or_else(|| config.and_then(|c| c.get_string("logging", "level")))
        .unwrap_or_else(|| "info".to_string());
    let format = cli
        .log_format
        .clone()
        .or_else(|| config.and_then(|c| c.get_string("logging", "format")))
        .unwrap_or_default();
    init_tracing(&level, LogFormat::parse(&format)?)
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, SmaCrossError> {
    let config = FileConfigAdapter::from_file(path)?;
    for key in config.unknown_keys() {
        warn!(path = %path.display(), %key, "ignoring unknown config key");
    }
    Ok(config)
}

fn window_param(name: &str, value: i64) -> Result<usize, SmaCrossError> {
    usize::try_from(value)
        .map_err(|_| SmaCrossError::invalid_parameter(name, format!("must be positive, got {value}")))
}

/// Merges command-line flags, an optional config file and the defaults.
/// Only parsing happens here; parameter semantics are checked by the
/// pipeline entry point.
pub fn resolve_settings(
    args: &BacktestArgs,
    config: Option<&dyn ConfigPort>,
) -> Result<RunSettings, SmaCrossError> {
    let cfg_string = |section: &str, key: &str| config.and_then(|c| c.get_string(section, key));
    let cfg_int = |key: &str, default: i64| {
        config.map_or(default, |c| c.get_int("backtest", key, default))
    };

    let code = args
        .code
        .clone()
        .or_else(|| cfg_string("backtest", "code"))
        .unwrap_or_else(|| DEFAULT_CODE.to_string())
        .trim()
        .to_uppercase();

    let start_str = args
        .start
        .clone()
        .or_else(|| cfg_string("backtest", "start_date"))
        .unwrap_or_else(|| DEFAULT_START_DATE.to_string());
    let end_str = args
        .end
        .clone()
        .or_else(|| cfg_string("backtest", "end_date"))
        .unwrap_or_else(|| DEFAULT_END_DATE.to_string());

    let short_window = args
        .short_window
        .unwrap_or_else(|| cfg_int("short_window", DEFAULT_SHORT_WINDOW as i64));
    let long_window = args
        .long_window
        .unwrap_or_else(|| cfg_int("long_window", DEFAULT_LONG_WINDOW as i64));
    let initial_cash = args.initial_cash.unwrap_or_else(|| {
        config.map_or(DEFAULT_INITIAL_CASH, |c| {
            c.get_double("backtest", "initial_cash", DEFAULT_INITIAL_CASH)
        })
    });

    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| cfg_string("data", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    Ok(RunSettings {
        code,
        start_date: parse_date(Some(&start_str), "start_date")?,
        end_date: parse_date(Some(&end_str), "end_date")?,
        params: CrossoverParams {
            short_window: window_param("short_window", short_window)?,
            long_window: window_param("long_window", long_window)?,
            initial_cash,
        },
        data_dir,
        chart_path: args
            .chart
            .clone()
            .or_else(|| cfg_string("report", "chart_path").map(PathBuf::from)),
        trades_path: args
            .trades
            .clone()
            .or_else(|| cfg_string("report", "trades_path").map(PathBuf::from)),
        print_trades: config.is_none_or(|c| c.get_bool("report", "print_trades", true)),
    })
}

fn apply_user_input(args: &mut BacktestArgs, input: prompt::UserInput) {
    args.code = Some(input.code);
    args.start = Some(input.start_date);
    args.end = Some(input.end_date);
    args.short_window = Some(input.short_window);
    args.long_window = Some(input.long_window);
}

fn run_backtest_command(
    mut args: BacktestArgs,
    config: Option<&FileConfigAdapter>,
) -> Result<(), SmaCrossError> {
    if args.interactive {
        let stdin = io::stdin();
        let input = prompt::read_user_input(&mut stdin.lock(), &mut io::stderr())?;
        apply_user_input(&mut args, input);
    }

    let settings = resolve_settings(&args, config.map(|c| c as &dyn ConfigPort))?;
    let source = CsvPriceAdapter::new(settings.data_dir.clone());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute_backtest(&source, &settings, &mut out)
}

/// Fetches prices, runs the pipeline, prints the report and writes any
/// requested chart or trade log.
pub fn execute_backtest(
    source: &dyn PriceSource,
    settings: &RunSettings,
    out: &mut dyn Write,
) -> Result<(), SmaCrossError> {
    settings.params.validate()?;

    info!(
        code = %settings.code,
        start = %settings.start_date,
        end = %settings.end_date,
        "fetching prices"
    );
    let prices = source.fetch_prices(&settings.code, settings.start_date, settings.end_date)?;

    let run = run_backtest(&prices, &settings.params)?;
    let report = run.metrics.report();

    writeln!(out, "\nPerformance Metrics ({}):", settings.code)?;
    for (label, value) in report.rows() {
        writeln!(out, "{label}: {value}")?;
    }

    if settings.print_trades {
        writeln!(out, "\nTrade Log:")?;
        if run.trade_log.is_empty() {
            writeln!(out, "  no crossovers in range")?;
        }
        for trade in &run.trade_log {
            writeln!(
                out,
                "  {}  {:<4}  {:>10.2}  {:>7.2}%",
                trade.date, trade.trade_type, trade.price, trade.return_pct
            )?;
        }
    }

    if let Some(path) = &settings.chart_path {
        SvgChartAdapter::new().write(&run, path)?;
        writeln!(out, "\nChart written to: {}", path.display())?;
    }
    if let Some(path) = &settings.trades_path {
        CsvTradeLogAdapter::new().write(&run, path)?;
        writeln!(out, "Trade log written to: {}", path.display())?;
    }

    Ok(())
}

/// Checks a config file and resolves it the way `backtest` would.
pub fn validate_config(config: &FileConfigAdapter) -> Result<RunSettings, SmaCrossError> {
    validate_backtest_config(config)?;
    let settings = resolve_settings(&BacktestArgs::default(), Some(config as &dyn ConfigPort))?;
    settings.params.validate()?;
    Ok(settings)
}

fn run_validate(path: &Path, config: &FileConfigAdapter) -> Result<(), SmaCrossError> {
    info!(path = %path.display(), "validating config");
    let settings = validate_config(config)?;

    for key in config.unknown_keys() {
        println!("warning: unknown key {key}");
    }
    println!("Configuration is valid:");
    println!("  code:         {}", settings.code);
    println!("  range:        {} to {}", settings.start_date, settings.end_date);
    println!(
        "  windows:      {} / {}",
        settings.params.short_window, settings.params.long_window
    );
    println!("  initial cash: {:.2}", settings.params.initial_cash);
    Ok(())
}

fn run_list_codes(
    data_dir: Option<PathBuf>,
    config: Option<&FileConfigAdapter>,
) -> Result<(), SmaCrossError> {
    let dir = data_dir
        .or_else(|| config.and_then(|c| c.get_string("data", "dir")).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    let codes = CsvPriceAdapter::new(dir.clone()).list_codes()?;
    if codes.is_empty() {
        eprintln!("No price files found in {}", dir.display());
    }
    for code in &codes {
        println!("{code}");
    }
    Ok(())
}
