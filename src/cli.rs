//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::sentiment_adapter::{ConstantSentiment, CsvSentimentAdapter};
use crate::adapters::trade_log_adapter::CsvTradeLogAdapter;
use crate::domain::backtest::{run_backtest, BacktestOptions};
use crate::domain::config_validation::{date_field, number_field, required_string, validate_config};
use crate::domain::error::SwingtraderError;
use crate::domain::risk::RiskConfig;
use crate::domain::sentiment::{SentimentLabel, SentimentSignal};
use crate::domain::strategy::{build_strategy, StrategyConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::sentiment_port::SentimentPort;
use chrono::NaiveDate;

#[derive(Parser, Debug)]
#[command(name = "swingtrader", about = "Single-instrument swing strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Write the trade ledger as CSV
        #[arg(short, long)]
        trades: Option<PathBuf>,
        /// Write the summary report as JSON
        #[arg(short, long)]
        report: Option<PathBuf>,
        /// Close a position still open after the last bar
        #[arg(long)]
        close_open: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the configured data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact()
        .with_env_filter(filter)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            trades,
            report,
            close_open,
        } => run_backtest_command(&config, trades.as_deref(), report.as_deref(), close_open),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = SwingtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Where the bars come from.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSelection {
    pub path: PathBuf,
    pub symbol: String,
    pub timeframe: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

pub fn build_data_selection(config: &dyn ConfigPort) -> Result<DataSelection, SwingtraderError> {
    Ok(DataSelection {
        path: PathBuf::from(required_string(config, "data", "path")?),
        symbol: required_string(config, "data", "symbol")?,
        timeframe: required_string(config, "data", "timeframe")?,
        start: date_field(config, "data", "start")?,
        end: date_field(config, "data", "end")?,
    })
}

pub fn build_risk_config(config: &dyn ConfigPort) -> Result<RiskConfig, SwingtraderError> {
    let capital_base = number_field(config, "risk", "capital_base")?
        .ok_or_else(|| SwingtraderError::missing("risk", "capital_base"))?;
    let risk_per_trade_percent = number_field(config, "risk", "risk_per_trade_percent")?
        .ok_or_else(|| SwingtraderError::missing("risk", "risk_per_trade_percent"))?;

    Ok(RiskConfig {
        capital_base,
        risk_per_trade_percent,
        taker_fee_percent: number_field(config, "risk", "taker_fee_percent")?.unwrap_or(0.0),
        slippage_percent: number_field(config, "risk", "slippage_percent")?.unwrap_or(0.0),
    })
}

/// `[strategy] name` plus every other key as a numeric parameter.
pub fn build_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, SwingtraderError> {
    let mut strategy = StrategyConfig::new(required_string(config, "strategy", "name")?);
    for key in config.section_keys("strategy") {
        if key == "name" {
            continue;
        }
        if let Some(value) = number_field(config, "strategy", &key)? {
            strategy.params.insert(key, value);
        }
    }
    Ok(strategy)
}

/// Scheduled sentiment when `[sentiment] schedule` is set, otherwise the
/// configured constant (neutral by default).
pub fn build_sentiment(
    config: &dyn ConfigPort,
) -> Result<Box<dyn SentimentPort>, SwingtraderError> {
    if let Some(path) = config.get_string("sentiment", "schedule") {
        let schedule = CsvSentimentAdapter::from_file(path.trim())?;
        eprintln!("Sentiment schedule: {} entries", schedule.len());
        return Ok(Box::new(schedule));
    }

    let neutral = SentimentSignal::neutral();
    let label = match config.get_string("sentiment", "label") {
        Some(raw) => raw
            .parse::<SentimentLabel>()
            .map_err(|reason| SwingtraderError::invalid("sentiment", "label", reason))?,
        None => neutral.label,
    };
    let score = number_field(config, "sentiment", "score")?.unwrap_or(neutral.score);
    Ok(Box::new(ConstantSentiment(SentimentSignal { label, score })))
}

pub fn build_options(config: &dyn ConfigPort, close_open_flag: bool) -> BacktestOptions {
    BacktestOptions {
        close_open_position: close_open_flag
            || config.get_bool("backtest", "close_open_position", false),
    }
}

fn run_backtest_command(
    config_path: &Path,
    trades_path: Option<&Path>,
    report_path: Option<&Path>,
    close_open: bool,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: Data source
    let selection = match build_data_selection(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let data_port = CsvAdapter::new(selection.path.clone());

    run_backtest_pipeline(
        &data_port,
        &adapter,
        &selection,
        build_options(&adapter, close_open),
        trades_path,
        report_path,
    )
}

/// Everything after the data source is chosen: strategy, sentiment, run,
/// console summary, exports.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    config: &dyn ConfigPort,
    selection: &DataSelection,
    options: BacktestOptions,
    trades_path: Option<&Path>,
    report_path: Option<&Path>,
) -> ExitCode {
    // Stage 3: Strategy, risk and sentiment
    let built = build_strategy_config(config).and_then(|strategy_config| {
        let strategy = build_strategy(&strategy_config)?;
        let risk = build_risk_config(config)?;
        let sentiment = build_sentiment(config)?;
        Ok((strategy, risk, sentiment))
    });
    let (strategy, risk, sentiment) = match built {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Loading strategy: {}", strategy.name());

    // Stage 4: Fetch bars
    let bars = match data_port.fetch_bars(
        &selection.symbol,
        &selection.timeframe,
        selection.start,
        selection.end,
    ) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!(
        "Running backtest: {} {} ({} bars)",
        selection.symbol,
        selection.timeframe,
        bars.len()
    );

    // Stage 5: Run
    let result = match run_backtest(
        &selection.symbol,
        bars,
        strategy.as_ref(),
        sentiment.as_ref(),
        risk,
        options,
    ) {
        Ok(r) => r,
        Err(failure) => {
            eprintln!("error: {}", failure.error);
            if !failure.completed_trades.is_empty() {
                eprintln!(
                    "{} trades completed before the abort",
                    failure.completed_trades.len()
                );
            }
            return (&failure.error).into();
        }
    };

    // Stage 6: Console summary
    eprintln!("\n{}", result.report);

    // Stage 7: Exports
    let exports: [(Option<&Path>, &dyn ReportPort, &str); 2] = [
        (trades_path, &CsvTradeLogAdapter, "Trade log"),
        (report_path, &JsonReportAdapter, "Report"),
    ];
    for (path, port, what) in exports {
        let Some(path) = path else {
            continue;
        };
        if let Err(e) = port.write(&result, path) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("{} written to: {}", what, path.display());
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let strategy = match build_strategy_config(&adapter).and_then(|c| build_strategy(&c)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let mut indicators: Vec<String> = strategy
        .required_indicators()
        .iter()
        .map(|i| i.to_string())
        .collect();
    indicators.sort();

    eprintln!("\nStrategy: {}", strategy.name());
    eprintln!("Indicators to compute:");
    for ind in &indicators {
        eprintln!("  {}", ind);
    }
    eprintln!("Minimum bars: {}", strategy.min_bars());

    if let Ok(risk) = build_risk_config(&adapter) {
        eprintln!(
            "\nRisk: capital {:.2}, {}% per trade, fee {}%, slippage {}%",
            risk.capital_base,
            risk.risk_per_trade_percent,
            risk.taker_fee_percent,
            risk.slippage_percent
        );
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let path = match required_string(&config, "data", "path") {
        Ok(p) => PathBuf::from(p),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let symbols = match CsvAdapter::new(path.clone()).list_symbols() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if symbols.is_empty() {
        eprintln!("No symbols found in {}", path.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}
