//! Trend command

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::{json, Value};
use spendlens_core::config::TrendConfig;
use spendlens_core::refresh::DashboardView;
use spendlens_core::{AnalyticsConfig, ApiClient};

use super::{print_json, refresh_dashboard};

/// Widest bar, in characters
const BAR_WIDTH: f64 = 30.0;

pub async fn cmd_trend(
    source: &ApiClient,
    config: &AnalyticsConfig,
    today: NaiveDate,
    as_json: bool,
) -> Result<()> {
    let view = refresh_dashboard(source, config, today).await?;

    if as_json {
        return print_json(trend_json(&view));
    }

    println!("{}", render_trend(&view, &config.trend));
    Ok(())
}

/// Trend series, or `null` when neither the remote nor the receipts were available
pub fn trend_json(view: &DashboardView) -> Value {
    json!(view.trend)
}

pub fn render_trend(view: &DashboardView, config: &TrendConfig) -> String {
    let mut lines = vec![
        String::new(),
        "📈 Monthly Trend".to_string(),
        "   ─────────────────────────────────────────────".to_string(),
    ];

    let Some(series) = view.trend.as_ref().and_then(|t| t.value()) else {
        lines.push("   Trend unavailable: receipts could not be loaded.".to_string());
        return lines.join("\n");
    };

    let span = config.height_span.max(1) as f64;
    for point in &series.points {
        let width = (point.height.saturating_sub(config.height_base) as f64 / span * BAR_WIDTH)
            .round() as usize;
        let bar = if point.is_forecast {
            "░".repeat(width.max(1))
        } else {
            "█".repeat(width.max(1))
        };
        lines.push(format!(
            "   {} {:>12.2} {}{}",
            point.month,
            point.amount,
            bar,
            if point.is_forecast { "  (forecast)" } else { "" }
        ));
    }

    lines.join("\n")
}
