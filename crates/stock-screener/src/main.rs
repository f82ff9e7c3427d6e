//! stock-screener: rank US common stocks by trailing new-high / new-low streaks.
//!
//! Usage:
//!   cargo run -p stock-screener                          # NasdaqTrader universe, first 100
//!   cargo run -p stock-screener -- --limit 0             # whole universe
//!   cargo run -p stock-screener -- --symbols AAPL MSFT   # explicit symbols

use anyhow::Context;
use market_data::{NasdaqTraderDirectory, PolygonClient};
use std::path::Path;
use std::sync::{Arc, Mutex};
use stock_screener::config::symbols_from_args;
use stock_screener::{ScreenConfig, ScreenOrchestrator, TracingTelemetry};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  stock-screener                          Screen active US stocks from NasdaqTrader");
    eprintln!("  stock-screener --symbols AAPL MSFT ...  Screen specific symbols");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --limit N               Max symbols per run, 0 = no cap (default: 100)");
    eprintln!("  --window N              Trading days of history (default: 63)");
    eprintln!("  --min-dollar-volume X   Liquidity threshold (default: 1000000)");
    eprintln!("  --output-dir PATH       Output directory (default: output)");
    eprintln!("  --report PATH           Report CSV path");
    eprintln!("  --bad-tickers PATH      Failure list path");
    eprintln!("  --top N                 Rows shown in the summary (default: 50)");
    eprintln!("  --sort streak|composite Report order (default: streak)");
    eprintln!();
    eprintln!("Environment: POLYGON_API_KEY (required), POLYGON_RATE_LIMIT, SCREENER_*");
}

fn init_tracing(log_path: &Path) -> anyhow::Result<()> {
    let log_file = std::fs::File::create(log_path)
        .with_context(|| format!("cannot create log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_screener=info,market_data=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut config = ScreenConfig::from_env()?;
    config.apply_args(&args)?;
    config
        .ensure_output_dir()
        .with_context(|| format!("cannot create {}", config.output_dir.display()))?;
    init_tracing(&config.log_path())?;

    let api_key = std::env::var("POLYGON_API_KEY").context("POLYGON_API_KEY must be set")?;
    let polygon = Arc::new(PolygonClient::new(api_key));

    tracing::info!(
        "stock-screener: window={}d, min $volume={}, cap={:?}, output={}",
        config.window_days,
        config.min_dollar_volume,
        config.max_symbols,
        config.output_dir.display()
    );

    let explicit_symbols = symbols_from_args(&args);
    let mut orchestrator = ScreenOrchestrator::new(config, polygon, Arc::new(TracingTelemetry));

    let run = match explicit_symbols {
        Some(symbols) => orchestrator.run(symbols).await,
        None => orchestrator.run_with_source(&NasdaqTraderDirectory::new()).await,
    }
    .context("screening run aborted")?;

    tracing::info!(
        "Done! {} candidates, {} processed, {} in report",
        run.summary.candidates,
        run.summary.processed,
        run.report.as_ref().map(|r| r.len()).unwrap_or(0)
    );
    Ok(())
}
