//! Budget command

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::{json, Value};
use spendlens_core::refresh::DashboardView;
use spendlens_core::{AnalyticsConfig, ApiClient};

use super::{budget_icon, print_json, refresh_dashboard, truncate};

pub async fn cmd_budget(
    source: &ApiClient,
    config: &AnalyticsConfig,
    today: NaiveDate,
    as_json: bool,
) -> Result<()> {
    let view = refresh_dashboard(source, config, today).await?;

    if as_json {
        return print_json(budget_json(&view));
    }

    println!("{}", render_budget(&view));
    Ok(())
}

pub fn budget_json(view: &DashboardView) -> Value {
    json!({
        "overview": view.budget,
        "monthlyBudget": view.monthly_budget,
    })
}

pub fn render_budget(view: &DashboardView) -> String {
    let mut lines = vec![
        String::new(),
        "💰 Budgets".to_string(),
        "   ─────────────────────────────────────────────────────────".to_string(),
    ];

    let Some(overview) = &view.budget else {
        lines.push("   Budgets could not be loaded.".to_string());
        return lines.join("\n");
    };

    if overview.categories.is_empty() {
        lines.push("   No budgets configured.".to_string());
        return lines.join("\n");
    }

    lines.push(format!(
        "   {} Limit {:.2} · Used {:.2} · Remaining {:.2} ({}%, {})",
        budget_icon(&overview.status),
        overview.total_limit,
        overview.total_used,
        overview.remaining,
        overview.usage_percent,
        overview.status.text
    ));
    lines.push(String::new());
    lines.push(format!(
        "   {:12} │ {:>10} │ {:>10} │ {:>5} │ {}",
        "Category", "Limit", "Used", "%", "Status"
    ));
    lines.push("   ─────────────┼────────────┼────────────┼───────┼──────────".to_string());
    for row in &overview.categories {
        lines.push(format!(
            "   {:12} │ {:>10.2} │ {:>10.2} │ {:>4}% │ {}{}",
            truncate(row.category.label(), 12),
            row.limit_amount,
            row.used_amount,
            row.percent,
            row.status.text,
            if row.is_over { " ⚠️" } else { "" }
        ));
    }

    lines.join("\n")
}
