//! pxfetch CLI: probe, fetch-and-export, show and delete commands.
//!
//! Commands:
//! - `check`: connectivity probe, echoes a message back
//! - `fetch`: download a daily history and write `<SYMBOL>.csv`
//! - `show`: print an exported file, optionally a date slice of it
//! - `delete`: remove an exported file

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pxfetch_core::data::{
    delete_export, export_history, load_export, DataProvider, HistoryRequest, Period, PriceRow,
    SyntheticProvider, YahooProvider,
};
use pxfetch_core::{check_connection, FetchConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "pxfetch=info,pxfetch_core=info";

#[derive(Parser)]
#[command(
    name = "pxfetch",
    version,
    about = "pxfetch: daily price history to CSV"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./pxfetch.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connectivity probe: echo a message back.
    Check {
        /// Message to echo. Defaults to "check".
        msg: Option<String>,
    },
    /// Download a daily price history and write it as <SYMBOL>.csv.
    Fetch {
        /// Ticker symbol (e.g., AAPL).
        symbol: String,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD), exclusive. Defaults to tomorrow when --start is given.
        #[arg(long)]
        end: Option<String>,

        /// Lookback period when no dates are given: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max.
        #[arg(long)]
        period: Option<String>,

        /// Output directory. Defaults to the config's out_dir (".").
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Use deterministic synthetic data instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Print the export summary as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the rows of an exported file.
    Show {
        /// Exported CSV file.
        file: PathBuf,

        /// First date to print (must be present in the file).
        #[arg(long, requires = "end")]
        start: Option<String>,

        /// Last date to print (must be present in the file).
        #[arg(long, requires = "start")]
        end: Option<String>,
    },
    /// Delete an exported file.
    Delete {
        /// File to remove.
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    init_logging();
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check { msg } => {
            println!("{}", check_connection(msg.as_deref()));
            Ok(())
        }
        Commands::Fetch {
            symbol,
            start,
            end,
            period,
            out_dir,
            synthetic,
            json,
        } => {
            let config = FetchConfig::discover(cli.config.as_deref())?;
            tracing::debug!(?config, "loaded config");
            run_fetch(
                &config,
                &symbol,
                start.as_deref(),
                end.as_deref(),
                period.as_deref(),
                out_dir,
                synthetic,
                json,
            )
        }
        Commands::Show { file, start, end } => run_show(&file, start.as_deref(), end.as_deref()),
        Commands::Delete { file } => Ok(delete_export(&file)?),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

#[allow(clippy::too_many_arguments)]
fn run_fetch(
    config: &FetchConfig,
    symbol: &str,
    start: Option<&str>,
    end: Option<&str>,
    period: Option<&str>,
    out_dir: Option<PathBuf>,
    synthetic: bool,
    json: bool,
) -> Result<()> {
    let period = match period {
        Some(p) => p.parse::<Period>()?,
        None => config.period,
    };

    let mut request = HistoryRequest::new(symbol)?.with_period(period);
    if let Some(s) = start {
        request = request.with_start(parse_date(s)?);
    }
    if let Some(e) = end {
        request = request.with_end(parse_date(e)?);
    }

    let out_dir = out_dir.unwrap_or_else(|| config.out_dir.clone());

    let provider: Box<dyn DataProvider> = if synthetic {
        Box::new(SyntheticProvider::default())
    } else {
        Box::new(YahooProvider::new(&config.yahoo)?)
    };

    let summary = export_history(provider.as_ref(), &request, &out_dir)
        .with_context(|| format!("failed to export {}", request.symbol))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.path.display());
        println!(
            "  {} rows, {} to {} ({})",
            summary.rows,
            summary.first_date,
            summary.last_date,
            provider.name()
        );
    }

    Ok(())
}

fn run_show(file: &Path, start: Option<&str>, end: Option<&str>) -> Result<()> {
    let history = load_export(file)?;

    let rows: &[PriceRow] = match (start, end) {
        (Some(s), Some(e)) => history.between(parse_date(s)?, parse_date(e)?)?,
        _ => &history.rows,
    };

    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>14}",
        "Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"
    );
    println!("{}", "-".repeat(82));
    for r in rows {
        println!(
            "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>14}",
            r.date.to_string(),
            r.open,
            r.high,
            r.low,
            r.close,
            r.adj_close,
            r.volume
        );
    }
    println!("{} row(s) from {}", rows.len(), history.path.display());

    Ok(())
}
