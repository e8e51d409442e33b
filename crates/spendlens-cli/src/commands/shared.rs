//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Resolve the analytics config with CLI overrides
//! - `build_source` - Pick the HTTP or offline source
//! - `refresh_dashboard` / `refresh_clusters` - Run one refresh and return the view
//! - Date parsing and JSON output helpers

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use spendlens_core::refresh::{ClusterView, DashboardView};
use spendlens_core::{
    AnalyticsConfig, AnalyticsSession, ApiClient, HttpSource, MonthKey, RecordSnapshot,
    SessionHandle,
};

/// Load config (explicit path or default location), then apply overrides
///
/// Priority for the API URL: --api-url > SPENDLENS_API_URL > config file.
pub fn load_config(path: Option<&Path>, api_url: Option<&str>) -> Result<AnalyticsConfig> {
    let config = match path {
        Some(path) => AnalyticsConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AnalyticsConfig::load().context("Failed to load analytics config")?,
    };

    let mut config = config.with_env_overrides();
    if let Some(url) = api_url.map(str::trim).filter(|u| !u.is_empty()) {
        config.remote.base_url = url.trim_end_matches('/').to_string();
    }
    Ok(config)
}

/// Offline source when a snapshot is given, else the HTTP source
pub fn build_source(
    config: &AnalyticsConfig,
    snapshot: Option<&Path>,
    token: Option<&str>,
) -> Result<ApiClient> {
    if let Some(path) = snapshot {
        return ApiClient::offline(path)
            .with_context(|| format!("Failed to load snapshot {}", path.display()));
    }

    let session = token
        .map(SessionHandle::new)
        .unwrap_or_else(SessionHandle::from_env);
    if !session.is_authenticated() {
        tracing::warn!("No session token (set SPENDLENS_TOKEN or --token); remote views will fall back to local results");
    }

    let source = HttpSource::new(&config.remote, session).context("Failed to build HTTP client")?;
    tracing::debug!(base_url = source.base_url(), "Using remote API");
    Ok(ApiClient::Http(source))
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse `YYYY-MM`
pub fn parse_month(s: &str) -> Result<MonthKey> {
    s.trim()
        .parse::<MonthKey>()
        .map_err(|e: String| anyhow::anyhow!(e))
        .with_context(|| format!("Invalid month '{}' (use YYYY-MM)", s))
}

/// Parse `YYYY-MM-DD`
pub fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", s))
}

/// Run one dashboard refresh and return the committed view
pub async fn refresh_dashboard(
    source: &ApiClient,
    config: &AnalyticsConfig,
    today: NaiveDate,
) -> Result<DashboardView> {
    let session = AnalyticsSession::new(config.clone());
    session.refresh_dashboard(source, today).await;
    session
        .view()
        .dashboard
        .context("Dashboard refresh was superseded")
}

/// Run one cluster refresh and return the committed view
pub async fn refresh_clusters(source: &ApiClient, config: &AnalyticsConfig) -> Result<ClusterView> {
    let session = AnalyticsSession::new(config.clone());
    session.refresh_clusters(source).await;
    session
        .view()
        .clusters
        .context("Cluster refresh was superseded")
}

/// Records of a refreshed view, or an error when they could not be fetched
pub fn require_snapshot(view: &DashboardView) -> Result<&RecordSnapshot> {
    view.snapshot
        .as_ref()
        .context("Receipts could not be loaded from the remote API")
}

pub fn print_json(value: Value) -> Result<()> {
    let text = serde_json::to_string_pretty(&value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}
