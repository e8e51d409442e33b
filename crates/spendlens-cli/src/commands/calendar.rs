//! Calendar command

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::json;
use spendlens_core::{AnalyticsConfig, ApiClient, CalendarMonth, DayExpenses, MonthKey};

use super::{parse_day, parse_month, print_json, refresh_dashboard, require_snapshot, truncate};

pub async fn cmd_calendar(
    source: &ApiClient,
    config: &AnalyticsConfig,
    today: NaiveDate,
    month: Option<&str>,
    day: Option<&str>,
    as_json: bool,
) -> Result<()> {
    let day = day.map(parse_day).transpose()?;
    let month = match (month, day) {
        (Some(m), _) => parse_month(m)?,
        (None, Some(d)) => MonthKey::of(d),
        (None, None) => MonthKey::of(today),
    };

    let view = refresh_dashboard(source, config, today).await?;
    let snapshot = require_snapshot(&view)?;
    let calendar = CalendarMonth::build(month, snapshot, today)
        .with_context(|| format!("Failed to build calendar for {}", month))?;
    let expenses = day.map(|d| DayExpenses::collect(snapshot, d));

    if as_json {
        return print_json(json!({
            "calendar": calendar,
            "day": expenses,
        }));
    }

    println!("{}", render_calendar(&calendar, expenses.as_ref()));
    Ok(())
}

pub fn render_calendar(calendar: &CalendarMonth, expenses: Option<&DayExpenses>) -> String {
    let mut lines = vec![
        String::new(),
        format!("📅 {}", calendar.month),
        "   Sun      Mon      Tue      Wed      Thu      Fri      Sat".to_string(),
    ];

    for week in calendar.days.chunks(7) {
        let days: Vec<String> = week
            .iter()
            .map(|cell| {
                let marker = if cell.is_today { '*' } else { ' ' };
                if cell.in_month {
                    format!("{:>2}{}", cell.day, marker)
                } else {
                    "   ".to_string()
                }
            })
            .collect();
        let totals: Vec<String> = week
            .iter()
            .map(|cell| {
                if cell.in_month && cell.has_data {
                    format!("{:>7.0}", cell.total)
                } else {
                    " ".repeat(7)
                }
            })
            .collect();
        lines.push(format!("   {}", days.join("      ")));
        lines.push(format!("  {}", totals.join("  ")));
    }

    if let Some(expenses) = expenses {
        lines.push(String::new());
        lines.push(format!("   {} · total {:.2}", expenses.date, expenses.total));
        if expenses.records.is_empty() {
            lines.push("   No receipts on this day.".to_string());
        }
        for record in &expenses.records {
            lines.push(format!(
                "   {:24} {:>10.2}  {}",
                truncate(&record.merchant_name, 24),
                record.amount,
                record.category_or_other()
            ));
        }
    }

    lines.join("\n")
}
