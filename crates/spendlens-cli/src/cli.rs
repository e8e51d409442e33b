//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Spendlens - Expense receipt analytics
#[derive(Parser)]
#[command(name = "spendlens")]
#[command(about = "Analytics over captured expense receipts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Analytics config file (defaults to the user data directory, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Remote API base URL (overrides config and SPENDLENS_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session token forwarded to the remote API (overrides SPENDLENS_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Read records from a local JSON snapshot instead of the remote API
    ///
    /// No remote calls are made; every view resolves through the local path.
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Print views as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Headline figures, category breakdown and monthly budget signal
    Dashboard,

    /// Spend-pattern clusters
    Clusters,

    /// Monthly trend with a one-month forecast
    Trend,

    /// Budget utilization by category
    Budget,

    /// Month calendar with per-day totals
    Calendar {
        /// Month to show (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Also list the receipts on this day (YYYY-MM-DD)
        #[arg(short, long)]
        day: Option<String>,
    },

    /// List receipts, optionally filtered
    Records {
        /// Case-insensitive match on merchant or item name
        #[arg(short, long)]
        keyword: Option<String>,

        /// Category (label such as 餐饮美食, or key such as dining)
        #[arg(short, long)]
        category: Option<String>,
    },
}
