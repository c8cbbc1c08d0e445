//! Volregime CLI binary.
//!
//! Provides a command-line interface for volatility regime analysis.

mod integration;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use integration::cache_manager;
use integration::data_pipeline::{CacheMode, load_prices};
use integration::terminal_notifier::TerminalNotifier;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use volregime::{AnalysisConfig, DEFAULT_START_DATE, DEFAULT_WINDOW, RegimeAnalysis};
use volregime_data::yahoo::YahooQuoteProvider;
use volregime_data::{FetchConfig, ResilientFetcher};
use volregime_output::{ExportFormat, Exporter};

#[derive(Parser)]
#[command(name = "volregime")]
#[command(about = "Volregime: volatility regime detection for daily prices", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a symbol's history into volatility regimes
    Analyze {
        /// Ticker symbol
        symbol: String,

        /// First date of price history (YYYY-MM-DD)
        #[arg(long, default_value_t = DEFAULT_START_DATE)]
        start: NaiveDate,

        /// Rolling volatility window in trading days (20, 30 and 60 are typical)
        #[arg(long, default_value_t = DEFAULT_WINDOW)]
        window: usize,

        /// Fetch attempts before giving up
        #[arg(long, default_value_t = 3)]
        max_attempts: u32,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the per-day regime series to this file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Write the regime regions to this file
        #[arg(long)]
        export_regions: Option<PathBuf>,

        /// Export file format (inferred from the extension when omitted)
        #[arg(long, value_enum)]
        export_format: Option<ExportKind>,

        /// Disable caching (always fetch fresh data)
        #[arg(long)]
        no_cache: bool,

        /// Force refresh cached data
        #[arg(long)]
        refresh: bool,
    },

    /// Inspect or clear the price cache
    Cache {
        /// Remove cached prices
        #[arg(long)]
        clear: bool,

        /// Only clear this symbol
        #[arg(long, requires = "clear")]
        symbol: Option<String>,

        /// Show cache statistics
        #[arg(long)]
        stats: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportKind {
    Csv,
    Json,
}

impl From<ExportKind> for ExportFormat {
    fn from(kind: ExportKind) -> Self {
        match kind {
            ExportKind::Csv => Self::Csv,
            ExportKind::Json => Self::PrettyJson,
        }
    }
}

/// Options for one `analyze` run.
struct AnalyzeOptions {
    config: AnalysisConfig,
    max_attempts: u32,
    format: OutputFormat,
    export: Option<PathBuf>,
    export_regions: Option<PathBuf>,
    export_format: Option<ExportKind>,
    cache_mode: CacheMode,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Analyze {
            symbol,
            start,
            window,
            max_attempts,
            format,
            export,
            export_regions,
            export_format,
            no_cache,
            refresh,
        } => {
            let options = AnalyzeOptions {
                config: AnalysisConfig {
                    start_date: start,
                    window,
                    ..AnalysisConfig::default()
                },
                max_attempts,
                format,
                export,
                export_regions,
                export_format,
                cache_mode: CacheMode {
                    use_cache: !no_cache,
                    force_refresh: refresh,
                },
            };
            analyze_symbol(&symbol, options).await?;
        }
        Commands::Cache {
            clear,
            symbol,
            stats,
        } => {
            manage_cache(clear, symbol.as_deref(), stats)?;
        }
    }

    Ok(())
}

async fn analyze_symbol(
    symbol: &str,
    options: AnalyzeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let symbol = symbol.trim().to_uppercase();

    let cache = if options.cache_mode.use_cache {
        match cache_manager::open_cache() {
            Ok(cache) => Some(cache),
            Err(e) => {
                tracing::warn!(error = %e, "price cache unavailable");
                None
            }
        }
    } else {
        None
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let provider = YahooQuoteProvider::new()?;
    let notifier = TerminalNotifier::with_progress(pb.clone());
    let fetcher = ResilientFetcher::with_notifier(provider, notifier)
        .with_config(FetchConfig::with_max_attempts(options.max_attempts));

    let prices = match load_prices(
        &fetcher,
        cache.as_ref(),
        &symbol,
        options.config.start_date,
        options.cache_mode,
        Some(&pb),
    )
    .await
    {
        Ok(prices) => {
            pb.finish_and_clear();
            prices
        }
        Err(e) => {
            pb.finish_and_clear();
            return Err(format!("Failed to load prices for {}: {}", symbol, e).into());
        }
    };

    let analysis = RegimeAnalysis::from_prices(prices, &options.config)?;
    let report = analysis.report()?;

    match options.format {
        OutputFormat::Text => print!("{}", report.to_ascii_table()),
        OutputFormat::Markdown => print!("{}", report.to_markdown()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    if let Some(path) = &options.export {
        let format = export_format(path, options.export_format)?;
        analysis.records().export_to_file(path, format)?;
        eprintln!("Wrote regime series to {}", path.display());
    }
    if let Some(path) = &options.export_regions {
        let format = export_format(path, options.export_format)?;
        analysis.region_records().export_to_file(path, format)?;
        eprintln!("Wrote regime regions to {}", path.display());
    }

    Ok(())
}

fn export_format(
    path: &Path,
    kind: Option<ExportKind>,
) -> Result<ExportFormat, volregime_output::ExportError> {
    kind.map_or_else(|| ExportFormat::from_path(path), |kind| Ok(kind.into()))
}

fn manage_cache(
    clear: bool,
    symbol: Option<&str>,
    stats: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let cache = cache_manager::open_cache()?;

    if clear {
        match symbol {
            Some(symbol) => {
                let symbol = symbol.trim().to_uppercase();
                cache.clear_symbol(&symbol)?;
                println!("Cleared cached prices for {}", symbol);
            }
            None => {
                cache.clear_all()?;
                println!("Cleared all cached prices");
            }
        }
    }

    if stats {
        let stats = cache.get_stats()?;
        println!("Cache location: {}", cache_manager::cache_path().display());
        println!("  Entries:      {} ({} fresh)", stats.entries, stats.fresh_entries);
        println!("  Symbols:      {}", stats.symbols);
        println!("  Price points: {}", stats.price_points);
        println!("  TTL:          {} minutes", cache.ttl().as_secs() / 60);
    }

    if !clear && !stats {
        println!("Nothing to do. Use --stats or --clear [--symbol SYMBOL]");
    }

    Ok(())
}
