use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::error::Result;

#[derive(Parser)]
#[command(name = "stockboard")]
#[command(about = "Stock screening dashboard data CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the screening table, filtered and sorted
    Screen {
        /// Column to sort by (e.g. market_cap, rsi_14, ma_alignment)
        #[arg(short, long, default_value = "market_cap")]
        sort: String,
        /// Sort descending instead of ascending
        #[arg(short, long)]
        desc: bool,
        /// Keep only these market stages (repeatable)
        #[arg(long)]
        stage: Vec<String>,
        /// Minimum RSI-14
        #[arg(long)]
        min_rsi: Option<f64>,
        /// Maximum RSI-14
        #[arg(long)]
        max_rsi: Option<f64>,
        /// Bypass the cache and fetch fresh data
        #[arg(short, long)]
        force: bool,
        /// Maximum rows to print
        #[arg(short, long, default_value_t = 25)]
        limit: usize,
    },
    /// Lay out the market-cap heatmap and print the placed tiles
    Heatmap {
        #[arg(long, default_value_t = 1000.0)]
        width: f64,
        #[arg(long, default_value_t = 600.0)]
        height: f64,
    },
    /// Print aggregate market statistics
    Summary,
    /// Show daily bars (and SMA overlays) for one ticker
    Daily {
        ticker: String,
        /// SMA periods to overlay (repeatable)
        #[arg(long)]
        sma: Vec<usize>,
        /// Number of most recent bars to print
        #[arg(short, long, default_value_t = 30)]
        limit: usize,
    },
    /// Export the merged rows as CSV
    Export {
        /// Output path
        #[arg(short, long, default_value = "stock-data.csv")]
        out: PathBuf,
    },
    /// Delete all cached data
    ClearCache,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Screen {
            sort,
            desc,
            stage,
            min_rsi,
            max_rsi,
            force,
            limit,
        } => {
            commands::screen::run(sort, desc, stage, min_rsi, max_rsi, force, limit).await
        }
        Commands::Heatmap { width, height } => commands::heatmap::run(width, height).await,
        Commands::Summary => commands::summary::run().await,
        Commands::Daily { ticker, sma, limit } => {
            commands::daily::run(&ticker, &sma, limit).await
        }
        Commands::Export { out } => commands::export::run(&out).await,
        Commands::ClearCache => commands::clear_cache::run(),
    }
}
