//! CLI definition and dispatch.

use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::console_report::{
    render_batch_report, render_detailed, render_history, render_portfolios,
};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_export_adapter::{default_export_path, CsvExportAdapter};
use crate::adapters::csv_sink_adapter::CsvSheetSink;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::{analyze_detailed, run_batch, AnalysisConfig, DEFAULT_LOOKBACK_DAYS};
use crate::domain::config_validation::{
    validate_config, validate_config_with, PORTFOLIO_SECTION_PREFIX,
};
use crate::domain::error::ScreenerError;
use crate::domain::history::{HistoryRow, HistorySummary, DEFAULT_HISTORY_LIMIT, SUMMARY_ROWS};
use crate::domain::portfolio::{parse_entries, Portfolio, DEFAULT_PORTFOLIO};
use crate::domain::signal::{SignalConfig, DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::sink_port::{RecordHistory, RecordSink};

pub use crate::domain::config_validation::AnalysisOverrides;

pub const DEFAULT_CSV_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "screener", about = "Moving-average stock screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyse every symbol of a portfolio
    Scan {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        portfolio: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        sink: Option<PathBuf>,
        /// Write results to CSV; without a path, analysis_<timestamp>.csv
        #[arg(long)]
        export: Option<Option<PathBuf>>,
        #[arg(long)]
        short: Option<usize>,
        #[arg(long)]
        long: Option<usize>,
    },
    /// Detailed analysis of one portfolio symbol
    Detail {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        portfolio: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        sink: Option<PathBuf>,
        #[arg(long)]
        short: Option<usize>,
        #[arg(long)]
        long: Option<usize>,
    },
    /// List built-in and configured portfolios
    Portfolios {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show rows previously recorded to the sink
    History {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        sink: Option<PathBuf>,
        /// Only rows for this symbol
        #[arg(short, long)]
        symbol: Option<String>,
        #[arg(short = 'n', long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },
    /// List symbols with a CSV file in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

/// Sources shared by `scan` and `detail`.
struct RunSources<'a> {
    config_path: Option<&'a PathBuf>,
    portfolio: Option<&'a str>,
    data_dir: Option<&'a Path>,
    sink: Option<&'a Path>,
    overrides: AnalysisOverrides,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Scan {
            config,
            portfolio,
            data_dir,
            sink,
            export,
            short,
            long,
        } => run_scan(
            RunSources {
                config_path: config.as_ref(),
                portfolio: portfolio.as_deref(),
                data_dir: data_dir.as_deref(),
                sink: sink.as_deref(),
                overrides: AnalysisOverrides {
                    short_window: short,
                    long_window: long,
                },
            },
            export.as_ref().map(|p| p.as_deref()),
        ),
        Command::Detail {
            symbol,
            config,
            portfolio,
            data_dir,
            sink,
            short,
            long,
        } => run_detail(
            &symbol,
            RunSources {
                config_path: config.as_ref(),
                portfolio: portfolio.as_deref(),
                data_dir: data_dir.as_deref(),
                sink: sink.as_deref(),
                overrides: AnalysisOverrides {
                    short_window: short,
                    long_window: long,
                },
            },
        ),
        Command::Portfolios { config } => run_portfolios(config.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::History {
            config,
            sink,
            symbol,
            limit,
        } => run_history(config.as_ref(), sink.as_deref(), symbol.as_deref(), limit),
        Command::ListSymbols { config, data_dir } => {
            run_list_symbols(config.as_ref(), data_dir.as_deref())
        }
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    info!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn load_optional_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(p) => load_config(p),
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn report_error(e: &ScreenerError) -> ExitCode {
    eprintln!("error: {e}");
    e.into()
}

fn usize_setting(
    config: &dyn ConfigPort,
    key: &str,
    default: usize,
    override_value: Option<usize>,
) -> Result<usize, ScreenerError> {
    if let Some(v) = override_value {
        return Ok(v);
    }
    let raw = config.get_int("analysis", key, default as i64);
    usize::try_from(raw).map_err(|_| ScreenerError::ConfigInvalid {
        section: "analysis".into(),
        key: key.into(),
        reason: format!("must not be negative (got {})", raw),
    })
}

pub fn build_analysis_config(
    config: &dyn ConfigPort,
    overrides: AnalysisOverrides,
) -> Result<AnalysisConfig, ScreenerError> {
    let short_window =
        usize_setting(config, "short_window", DEFAULT_SHORT_WINDOW, overrides.short_window)?;
    let long_window =
        usize_setting(config, "long_window", DEFAULT_LONG_WINDOW, overrides.long_window)?;
    let lookback_days = usize_setting(config, "lookback_days", DEFAULT_LOOKBACK_DAYS, None)?;

    if short_window == 0 {
        return Err(ScreenerError::ConfigInvalid {
            section: "analysis".into(),
            key: "short_window".into(),
            reason: "short_window must be at least 1".into(),
        });
    }
    if long_window <= short_window {
        return Err(ScreenerError::ConfigInvalid {
            section: "analysis".into(),
            key: "long_window".into(),
            reason: format!(
                "long_window ({}) must be greater than short_window ({})",
                long_window, short_window
            ),
        });
    }
    if lookback_days < short_window {
        return Err(ScreenerError::ConfigInvalid {
            section: "analysis".into(),
            key: "lookback_days".into(),
            reason: format!(
                "lookback_days ({}) must be at least short_window ({})",
                lookback_days, short_window
            ),
        });
    }
    if lookback_days < long_window {
        warn!(
            "lookback_days ({}) is shorter than long_window ({}); long-average signals will never fire",
            lookback_days, long_window
        );
    }

    Ok(AnalysisConfig {
        signal: SignalConfig {
            short_window,
            long_window,
        },
        lookback_days,
    })
}

fn portfolio_from_section(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<Portfolio>, ScreenerError> {
    let section = format!("{}{}", PORTFOLIO_SECTION_PREFIX, key);
    if !config.sections().contains(&section) {
        return Ok(None);
    }
    let entries = config
        .get_string(&section, "entries")
        .ok_or_else(|| ScreenerError::ConfigMissing {
            section: section.clone(),
            key: "entries".into(),
        })?;
    let name = config
        .get_string(&section, "name")
        .unwrap_or_else(|| key.to_string());
    let portfolio = Portfolio::new(name.trim(), parse_entries(&entries)?)?;
    Ok(Some(portfolio))
}

/// The portfolio to analyse: `selection`, else `[portfolio] active`, else
/// the GAFAM preset. A `[portfolio.<key>]` section shadows a preset of the
/// same key.
pub fn resolve_portfolio(
    config: &dyn ConfigPort,
    selection: Option<&str>,
) -> Result<Portfolio, ScreenerError> {
    let key = selection
        .map(str::to_string)
        .or_else(|| config.get_string("portfolio", "active"))
        .unwrap_or_else(|| DEFAULT_PORTFOLIO.to_string())
        .trim()
        .to_lowercase();

    if let Some(portfolio) = portfolio_from_section(config, &key)? {
        return Ok(portfolio);
    }
    Portfolio::preset(&key).ok_or_else(|| ScreenerError::ConfigInvalid {
        section: "portfolio".into(),
        key: "active".into(),
        reason: format!("no portfolio named '{}'", key),
    })
}

/// Presets followed by configured portfolios, keyed by their selection name.
pub fn list_portfolios(config: &dyn ConfigPort) -> Result<Vec<(String, Portfolio)>, ScreenerError> {
    let mut portfolios: Vec<(String, Portfolio)> = Vec::new();
    for key in Portfolio::preset_keys() {
        if let Some(p) = Portfolio::preset(key) {
            portfolios.push((key.to_string(), p));
        }
    }

    for section in config.sections() {
        let Some(key) = section.strip_prefix(PORTFOLIO_SECTION_PREFIX) else {
            continue;
        };
        let Some(portfolio) = portfolio_from_section(config, key)? else {
            continue;
        };
        match portfolios.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = portfolio,
            None => portfolios.push((key.to_string(), portfolio)),
        }
    }
    Ok(portfolios)
}

fn csv_dir(config: &dyn ConfigPort, data_dir: Option<&Path>) -> PathBuf {
    data_dir
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("data", "csv_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_DIR))
}

/// The configured price provider. `--data-dir` always selects CSV files.
pub fn build_data_port(
    config: &dyn ConfigPort,
    data_dir: Option<&Path>,
) -> Result<Box<dyn DataPort>, ScreenerError> {
    let source = if data_dir.is_some() {
        "csv".to_string()
    } else {
        config
            .get_string("data", "source")
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_else(|| "csv".to_string())
    };

    match source.as_str() {
        "csv" => {
            let dir = csv_dir(config, data_dir);
            info!("Reading prices from {}", dir.display());
            Ok(Box::new(CsvAdapter::new(dir)))
        }
        "yahoo" => build_yahoo_port(config),
        other => Err(ScreenerError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown source '{}'", other),
        }),
    }
}

#[cfg(feature = "yahoo")]
fn build_yahoo_port(config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, ScreenerError> {
    use crate::adapters::yahoo_adapter::YahooAdapter;
    use crate::domain::config_validation::DEFAULT_FETCH_TIMEOUT_SECS;

    let timeout = config.get_int("analysis", "fetch_timeout_secs", DEFAULT_FETCH_TIMEOUT_SECS);
    let timeout = u64::try_from(timeout)
        .ok()
        .filter(|t| *t > 0)
        .ok_or_else(|| ScreenerError::ConfigInvalid {
            section: "analysis".into(),
            key: "fetch_timeout_secs".into(),
            reason: "fetch_timeout_secs must be at least 1".into(),
        })?;
    info!("Fetching prices from Yahoo Finance (timeout {}s)", timeout);
    Ok(Box::new(YahooAdapter::new(timeout)?))
}

#[cfg(not(feature = "yahoo"))]
fn build_yahoo_port(_config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, ScreenerError> {
    Err(ScreenerError::ConfigInvalid {
        section: "data".into(),
        key: "source".into(),
        reason: "yahoo feature is required for source = yahoo".into(),
    })
}

/// `--sink` wins over `[sink] path`; neither means no sink.
pub fn build_sink(config: &dyn ConfigPort, sink: Option<&Path>) -> Option<CsvSheetSink> {
    sink.map(Path::to_path_buf)
        .or_else(|| config.get_string("sink", "path").map(PathBuf::from))
        .map(CsvSheetSink::new)
}

struct Prepared {
    config: AnalysisConfig,
    portfolio: Portfolio,
    data_port: Box<dyn DataPort>,
    sink: Option<CsvSheetSink>,
}

fn prepare_with(
    adapter: &dyn ConfigPort,
    sources: &RunSources<'_>,
) -> Result<Prepared, ScreenerError> {
    validate_config_with(adapter, sources.overrides)?;
    Ok(Prepared {
        config: build_analysis_config(adapter, sources.overrides)?,
        portfolio: resolve_portfolio(adapter, sources.portfolio)?,
        data_port: build_data_port(adapter, sources.data_dir)?,
        sink: build_sink(adapter, sources.sink),
    })
}

fn prepare(sources: &RunSources<'_>) -> Result<Prepared, ExitCode> {
    let adapter = load_optional_config(sources.config_path)?;
    prepare_with(&adapter, sources).map_err(|e| report_error(&e))
}

fn run_scan(sources: RunSources<'_>, export: Option<Option<&Path>>) -> ExitCode {
    let prepared = match prepare(&sources) {
        Ok(p) => p,
        Err(code) => return code,
    };

    info!(
        "Analysing {} ({} symbols)",
        prepared.portfolio.name,
        prepared.portfolio.len()
    );
    if let Some(sink) = &prepared.sink {
        info!("Appending rows to {}", sink.path().display());
    }

    let outcome = run_batch(
        &prepared.portfolio,
        prepared.data_port.as_ref(),
        prepared.sink.as_ref().map(|s| s as &dyn RecordSink),
        &prepared.config,
    );

    print!("{}", render_batch_report(&prepared.portfolio.name, &outcome));

    if let Some(path) = export {
        let output = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_export_path(Path::new("."), Local::now().naive_local()));
        if let Err(e) = CsvExportAdapter.write(&outcome.results, &output) {
            return report_error(&e);
        }
        eprintln!("\nResults exported to: {}", output.display());
    }

    if outcome.results.is_empty() {
        eprintln!("error: no symbols could be analysed");
        return ExitCode::from(4);
    }
    ExitCode::SUCCESS
}

fn run_detail(symbol: &str, sources: RunSources<'_>) -> ExitCode {
    let prepared = match prepare(&sources) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let detail = analyze_detailed(
        &prepared.portfolio,
        symbol,
        prepared.data_port.as_ref(),
        prepared.sink.as_ref().map(|s| s as &dyn RecordSink),
        &prepared.config,
    );

    match detail {
        Ok(d) => {
            print!("{}", render_detailed(&d));
            if prepared.sink.is_some() && !d.sink_written {
                eprintln!("warning: analysis was not recorded to the sink");
            }
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn run_portfolios(config_path: Option<&PathBuf>) -> ExitCode {
    let adapter = match load_optional_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match list_portfolios(&adapter) {
        Ok(portfolios) => {
            print!("{}", render_portfolios(&portfolios));
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let checked = validate_config(&adapter).and_then(|()| {
        let config = build_analysis_config(&adapter, AnalysisOverrides::default())?;
        let portfolio = resolve_portfolio(&adapter, None)?;
        Ok((config, portfolio))
    });

    match checked {
        Ok((config, portfolio)) => {
            eprintln!(
                "Windows: short {}, long {}; lookback {} bars",
                config.signal.short_window, config.signal.long_window, config.lookback_days
            );
            eprintln!(
                "Active portfolio: {} ({})",
                portfolio.name,
                portfolio.symbols().join(", ")
            );
            eprintln!("\nConfiguration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

/// The trailing `limit` rows plus a tally over the trailing `SUMMARY_ROWS`.
pub fn read_history(
    history: &dyn RecordHistory,
    symbol: Option<&str>,
    limit: usize,
) -> Result<(Vec<HistoryRow>, HistorySummary), ScreenerError> {
    let rows = history.history(symbol, limit)?;
    let recent = history.history(symbol, SUMMARY_ROWS)?;
    Ok((rows, HistorySummary::compute(&recent)))
}

fn run_history(
    config_path: Option<&PathBuf>,
    sink: Option<&Path>,
    symbol: Option<&str>,
    limit: usize,
) -> ExitCode {
    let adapter = match load_optional_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let Some(sink) = build_sink(&adapter, sink) else {
        return report_error(&ScreenerError::ConfigMissing {
            section: "sink".into(),
            key: "path".into(),
        });
    };

    info!("Reading history from {}", sink.path().display());
    match read_history(&sink, symbol, limit) {
        Ok((rows, summary)) => {
            print!("{}", render_history(&rows, &summary));
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn run_list_symbols(config_path: Option<&PathBuf>, data_dir: Option<&Path>) -> ExitCode {
    let adapter = match load_optional_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let dir = csv_dir(&adapter, data_dir);

    match CsvAdapter::new(dir.clone()).list_symbols() {
        Ok(symbols) if symbols.is_empty() => {
            eprintln!("No symbols found in {}", dir.display());
            ExitCode::SUCCESS
        }
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            eprintln!("{} symbols found", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}
