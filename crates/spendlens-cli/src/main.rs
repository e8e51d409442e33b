//! Spendlens CLI - Expense receipt analytics
//!
//! Usage:
//!   spendlens dashboard                  Headline figures and budget signal
//!   spendlens clusters                   Spend-pattern clusters
//!   spendlens trend                      Six-month trend with forecast
//!   spendlens budget                     Budget utilization
//!   spendlens calendar --month 2026-03   Month calendar
//!   spendlens --snapshot records.json …  Work offline from a JSON file

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.api_url.as_deref())?;
    let source = commands::build_source(&config, cli.snapshot.as_deref(), cli.token.as_deref())?;
    let today = commands::today();

    match cli.command {
        Commands::Dashboard => commands::cmd_dashboard(&source, &config, today, cli.json).await,
        Commands::Clusters => commands::cmd_clusters(&source, &config, cli.json).await,
        Commands::Trend => commands::cmd_trend(&source, &config, today, cli.json).await,
        Commands::Budget => commands::cmd_budget(&source, &config, today, cli.json).await,
        Commands::Calendar { month, day } => {
            commands::cmd_calendar(
                &source,
                &config,
                today,
                month.as_deref(),
                day.as_deref(),
                cli.json,
            )
            .await
        }
        Commands::Records { keyword, category } => {
            commands::cmd_records(
                &source,
                &config,
                today,
                keyword.as_deref(),
                category.as_deref(),
                cli.json,
            )
            .await
        }
    }
}
