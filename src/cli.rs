//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::macro_file_adapter::load_macro_file;
use crate::adapters::text_report;
use crate::domain::analysis::{
    self, AnalysisConfig, DEFAULT_SMA_WINDOW, DEFAULT_STARTING_BALANCE,
};
use crate::domain::classifier::DEFAULT_SLOPE_TOLERANCE;
use crate::domain::config_validation::{
    parse_horizons, parse_optional_date, validate_analysis_config, MAX_STARTING_BALANCE,
    MIN_STARTING_BALANCE,
};
use crate::domain::error::AnalyticsError;
use crate::domain::fuzzy::{suggest, DEFAULT_MAX_DISTANCE};
use crate::domain::segmentation::TieBreak;
use crate::domain::series::RawObservation;
use crate::domain::ticker::{parse_allocation, resolve_ticker};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::SeriesProvider;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_MACRO_FILE: &str = "CPI.txt";
const TABLE_TAIL: usize = 15;

#[derive(Parser, Debug)]
#[command(name = "stockscope", about = "Financial time-series analytics")]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory holding one `<TICKER>.csv` per symbol
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simple moving average of closing prices
    Sma {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(short, long)]
        ticker: String,
        #[arg(short, long)]
        window: Option<usize>,
    },
    /// Split a price series into up/down trend segments
    Trends {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(short, long)]
        ticker: String,
    },
    /// Best buy/sell pairs with unlimited transactions
    Profit {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(short, long)]
        ticker: String,
    },
    /// Classify recent CPI trend over several horizons
    Classify {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(long)]
        horizons: Option<String>,
        #[arg(long)]
        tolerance: Option<f64>,
    },
    /// Simulate a weighted portfolio
    Portfolio {
        #[command(flatten)]
        common: CommonArgs,
        /// Comma list of TICKER:PERCENT, e.g. AAPL:60,MSFT:40
        #[arg(short, long)]
        allocation: Option<String>,
        #[arg(short, long)]
        balance: Option<f64>,
    },
    /// Suggest known tickers close to the input
    Suggest {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(short, long)]
        ticker: String,
        #[arg(long)]
        max_distance: Option<usize>,
    },
    /// List tickers available in the data directory
    Symbols {
        #[command(flatten)]
        common: CommonArgs,
    },
}

pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli.command) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Run one subcommand and return its rendered output.
pub fn execute(command: Command) -> Result<String, AnalyticsError> {
    match command {
        Command::Sma {
            common,
            ticker,
            window,
        } => run_sma(&common, &ticker, window),
        Command::Trends { common, ticker } => run_trends(&common, &ticker),
        Command::Profit { common, ticker } => run_profit(&common, &ticker),
        Command::Classify {
            common,
            file,
            horizons,
            tolerance,
        } => run_classify(&common, file, horizons.as_deref(), tolerance),
        Command::Portfolio {
            common,
            allocation,
            balance,
        } => run_portfolio(&common, allocation.as_deref(), balance),
        Command::Suggest {
            common,
            ticker,
            max_distance,
        } => run_suggest(&common, &ticker, max_distance),
        Command::Symbols { common } => run_symbols(&common),
    }
}

/// Everything a subcommand needs, resolved from flags and config.
pub struct Context {
    pub config: FileConfigAdapter,
    pub settings: AnalysisConfig,
    pub data_dir: PathBuf,
}

impl Context {
    pub fn provider(&self) -> CsvAdapter {
        CsvAdapter::new(self.data_dir.clone())
    }
}

pub fn load_context(common: &CommonArgs) -> Result<Context, AnalyticsError> {
    let config = match &common.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path)?
        }
        None => FileConfigAdapter::empty(),
    };
    validate_analysis_config(&config)?;

    let mut settings = build_analysis_config(&config)?;
    if common.start.is_some() {
        settings.start_date = common.start;
    }
    if common.end.is_some() {
        settings.end_date = common.end;
    }
    if let (Some(start), Some(end)) = (settings.start_date, settings.end_date) {
        if start > end {
            return Err(AnalyticsError::config_invalid(
                "portfolio",
                "start_date",
                format!("start date {} is after end date {}", start, end),
            ));
        }
    }

    let data_dir = common
        .data_dir
        .clone()
        .or_else(|| config.get_string("data", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    Ok(Context {
        config,
        settings,
        data_dir,
    })
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, AnalyticsError> {
    let horizons = match config.get_string("classifier", "horizons") {
        Some(raw) => parse_horizons(&raw)
            .map_err(|reason| AnalyticsError::config_invalid("classifier", "horizons", reason))?,
        None => AnalysisConfig::default().horizons,
    };

    let tie_break = match config.get_string("trends", "tie_break") {
        Some(raw) => raw
            .parse::<TieBreak>()
            .map_err(|reason| AnalyticsError::config_invalid("trends", "tie_break", reason))?,
        None => TieBreak::default(),
    };

    let resync = config.get_int("sma", "resync_every", 0);

    Ok(AnalysisConfig {
        sma_window: config.get_int("sma", "window", DEFAULT_SMA_WINDOW as i64).max(0) as usize,
        sma_resync_every: (resync > 0).then_some(resync as usize),
        slope_tolerance: config.get_double("classifier", "tolerance", DEFAULT_SLOPE_TOLERANCE),
        horizons,
        tie_break,
        starting_balance: config.get_double(
            "portfolio",
            "starting_balance",
            DEFAULT_STARTING_BALANCE,
        ),
        max_distance: config
            .get_int("fuzzy", "max_distance", DEFAULT_MAX_DISTANCE as i64)
            .max(0) as usize,
        start_date: parse_optional_date(config, "start_date")?,
        end_date: parse_optional_date(config, "end_date")?,
    })
}

/// Resolve a user-entered ticker against the provider's symbol list, then
/// fetch its rows. Unknown tickers come back with suggestions attached.
pub fn fetch_ticker(
    provider: &dyn SeriesProvider,
    input: &str,
    settings: &AnalysisConfig,
) -> Result<(String, Vec<RawObservation>), AnalyticsError> {
    let known = provider.list_tickers()?;
    let ticker = resolve_ticker(input, &known, settings.max_distance)?;
    let rows = provider.fetch_prices(&ticker, settings.start_date, settings.end_date)?;
    tracing::info!(ticker = %ticker, rows = rows.len(), "fetched prices");
    Ok((ticker, rows))
}

fn run_sma(common: &CommonArgs, ticker: &str, window: Option<usize>) -> Result<String, AnalyticsError> {
    let ctx = load_context(common)?;
    let window = window.unwrap_or(ctx.settings.sma_window);
    let (ticker, rows) = fetch_ticker(&ctx.provider(), ticker, &ctx.settings)?;

    tracing::info!(ticker = %ticker, window, "computing SMA");
    let report = analysis::run_sma(rows, window, ctx.settings.sma_resync_every)?;
    Ok(text_report::format_sma(&ticker, &report, TABLE_TAIL))
}

fn run_trends(common: &CommonArgs, ticker: &str) -> Result<String, AnalyticsError> {
    let ctx = load_context(common)?;
    let (ticker, rows) = fetch_ticker(&ctx.provider(), ticker, &ctx.settings)?;

    let report = analysis::run_trends(rows, ctx.settings.tie_break)?;
    tracing::info!(ticker = %ticker, segments = report.segments.len(), "segmented series");
    Ok(text_report::format_trends(&ticker, &report))
}

fn run_profit(common: &CommonArgs, ticker: &str) -> Result<String, AnalyticsError> {
    let ctx = load_context(common)?;
    let (ticker, rows) = fetch_ticker(&ctx.provider(), ticker, &ctx.settings)?;

    let (_, plan) = analysis::run_profit(rows)?;
    tracing::info!(ticker = %ticker, trades = plan.trades.len(), "optimized trades");
    Ok(text_report::format_profit(&ticker, &plan))
}

fn run_classify(
    common: &CommonArgs,
    file: Option<PathBuf>,
    horizons: Option<&str>,
    tolerance: Option<f64>,
) -> Result<String, AnalyticsError> {
    let ctx = load_context(common)?;
    let path = file
        .or_else(|| ctx.config.get_string("data", "macro_file").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MACRO_FILE));

    let horizons = match horizons {
        Some(raw) => parse_horizons(raw).map_err(|reason| {
            AnalyticsError::config_invalid("classifier", "horizons", reason)
        })?,
        None => ctx.settings.horizons.clone(),
    };
    let tolerance = tolerance.unwrap_or(ctx.settings.slope_tolerance);
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(AnalyticsError::config_invalid(
            "classifier",
            "tolerance",
            "tolerance must be non-negative",
        ));
    }

    tracing::info!(path = %path.display(), "loading macro records");
    let mut load = load_macro_file(&path)?;
    load.retain_dates(common.start, common.end);
    let series = load.actual_series()?;
    let results = analysis::run_classification(&series, &horizons, tolerance);

    let mut out = text_report::format_classification(&results);
    out.push('\n');
    out.push_str(&text_report::format_macro_table(&load.records, TABLE_TAIL));
    Ok(out)
}

fn run_portfolio(
    common: &CommonArgs,
    allocation: Option<&str>,
    balance: Option<f64>,
) -> Result<String, AnalyticsError> {
    let ctx = load_context(common)?;
    let raw_allocation = allocation
        .map(str::to_string)
        .or_else(|| ctx.config.get_string("portfolio", "allocation"))
        .ok_or_else(|| AnalyticsError::ConfigMissing {
            section: "portfolio".into(),
            key: "allocation".into(),
        })?;
    let allocation = parse_allocation(&raw_allocation)?;
    let balance = balance.unwrap_or(ctx.settings.starting_balance);
    if !(MIN_STARTING_BALANCE..=MAX_STARTING_BALANCE).contains(&balance) {
        return Err(AnalyticsError::config_invalid(
            "portfolio",
            "starting_balance",
            format!(
                "starting_balance must be between {} and {}",
                MIN_STARTING_BALANCE, MAX_STARTING_BALANCE
            ),
        ));
    }

    let provider = ctx.provider();
    let mut rows_by_ticker = BTreeMap::new();
    for ticker in allocation.tickers() {
        let (ticker, rows) = fetch_ticker(&provider, ticker, &ctx.settings)?;
        rows_by_ticker.insert(ticker, rows);
    }

    tracing::info!(tickers = allocation.len(), balance, "simulating portfolio");
    let sim = analysis::run_portfolio(rows_by_ticker, &allocation, balance)?;
    Ok(text_report::format_portfolio(&sim, TABLE_TAIL))
}

fn run_suggest(
    common: &CommonArgs,
    ticker: &str,
    max_distance: Option<usize>,
) -> Result<String, AnalyticsError> {
    let ctx = load_context(common)?;
    let known = ctx.provider().list_tickers()?;
    let max_distance = max_distance.unwrap_or(ctx.settings.max_distance);
    let suggestions = suggest(ticker, &known, max_distance);
    Ok(text_report::format_suggestions(ticker, &suggestions))
}

fn run_symbols(common: &CommonArgs) -> Result<String, AnalyticsError> {
    let ctx = load_context(common)?;
    let tickers = ctx.provider().list_tickers()?;
    tracing::info!(count = tickers.len(), dir = %ctx.data_dir.display(), "listed tickers");

    let mut out = String::new();
    for t in &tickers {
        out.push_str(t);
        out.push('\n');
    }
    Ok(out)
}
