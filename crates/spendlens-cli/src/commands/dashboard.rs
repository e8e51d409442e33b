//! Dashboard command

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::{json, Value};
use spendlens_core::refresh::DashboardView;
use spendlens_core::{AnalyticsConfig, ApiClient, BudgetLevel, BudgetStatus};

use super::{print_json, refresh_dashboard};

pub async fn cmd_dashboard(
    source: &ApiClient,
    config: &AnalyticsConfig,
    today: NaiveDate,
    as_json: bool,
) -> Result<()> {
    let view = refresh_dashboard(source, config, today).await?;

    if as_json {
        return print_json(dashboard_json(&view));
    }

    println!("{}", render_dashboard(&view));
    Ok(())
}

/// Dashboard display models; unavailable parts are `null`
pub fn dashboard_json(view: &DashboardView) -> Value {
    json!({
        "summary": view.summary,
        "categories": view.categories,
        "budget": view.budget,
        "monthlyBudget": view.monthly_budget,
        "recordsAvailable": !view.records_unavailable(),
        "budgetsAvailable": !view.budgets_unavailable(),
        "invalidRecords": view.invalid_records,
    })
}

pub fn budget_icon(status: &BudgetStatus) -> &'static str {
    match status.level {
        BudgetLevel::Normal => "🟢",
        BudgetLevel::Warning => "🟡",
        BudgetLevel::Exceeded => "🔴",
    }
}

pub fn render_dashboard(view: &DashboardView) -> String {
    let mut lines = vec![String::new()];

    let Some(summary) = &view.summary else {
        lines.push("📊 Spending Dashboard".to_string());
        lines.push("   ─────────────────────────────────────────────".to_string());
        lines.push("   Receipts could not be loaded; spending figures are unavailable.".to_string());
        lines.push(monthly_budget_line(view));
        return lines.join("\n");
    };

    lines.push(format!("📊 Spending Dashboard ({})", summary.month));
    lines.push("   ─────────────────────────────────────────────".to_string());
    lines.push(format!(
        "   Total:       {:>12.2}  ({} receipts)",
        summary.total_amount, summary.total_count
    ));
    lines.push(format!("   This month:  {:>12.2}", summary.month_amount));
    lines.push(format!("   Last month:  {:>12.2}", summary.previous_month_amount));
    lines.push(format!("   Change:      {:>+11.1}%", summary.month_rate));
    match summary.top_category {
        Some(category) => lines.push(format!(
            "   Top:         {} ({}%)",
            category, summary.top_percent
        )),
        None => lines.push("   Top:         -".to_string()),
    }
    if view.invalid_records > 0 {
        lines.push(format!(
            "   ⚠️  {} receipts with an invalid amount were left out",
            view.invalid_records
        ));
    }

    lines.push(String::new());
    lines.push(monthly_budget_line(view));

    if !view.categories.is_empty() {
        lines.push(String::new());
        lines.push(format!("   {:12} │ {:>12} │ {:>4}", "Category", "Amount", "%"));
        lines.push("   ─────────────┼──────────────┼─────".to_string());
        for share in &view.categories {
            lines.push(format!(
                "   {:12} │ {:>12.2} │ {:>3}%",
                share.category.label(),
                share.amount,
                share.percent
            ));
        }
    }

    lines.join("\n")
}

fn monthly_budget_line(view: &DashboardView) -> String {
    match &view.monthly_budget {
        Some(status) => format!(
            "   {} Monthly budget: {} ({:.1}% used)",
            budget_icon(status),
            status.text,
            status.percent
        ),
        None if view.budgets_unavailable() => {
            "   ⚪ Monthly budget: unavailable (budgets could not be loaded)".to_string()
        }
        None => "   ⚪ Monthly budget: unavailable (receipts could not be loaded)".to_string(),
    }
}
