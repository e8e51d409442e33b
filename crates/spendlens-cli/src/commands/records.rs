//! Records command

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde_json::json;
use spendlens_core::{AnalyticsConfig, ApiClient, Category, ExpenseRecord, RecordFilter};

use super::{print_json, refresh_dashboard, require_snapshot, truncate};

/// Build a filter from CLI arguments
pub fn build_filter(keyword: Option<&str>, category: Option<&str>) -> Result<RecordFilter> {
    let mut filter = RecordFilter::default();
    if let Some(keyword) = keyword {
        filter = filter.keyword(keyword);
    }
    if let Some(category) = category {
        let category: Category = category.parse().map_err(|e: String| anyhow!(e))?;
        filter = filter.category(category);
    }
    Ok(filter)
}

pub async fn cmd_records(
    source: &ApiClient,
    config: &AnalyticsConfig,
    today: NaiveDate,
    keyword: Option<&str>,
    category: Option<&str>,
    as_json: bool,
) -> Result<()> {
    let filter = build_filter(keyword, category)?;
    let view = refresh_dashboard(source, config, today).await?;
    let snapshot = require_snapshot(&view)?;
    let records = snapshot.filter(&filter);

    if as_json {
        return print_json(json!(records));
    }

    println!("{}", render_records(&records, snapshot.len()));
    Ok(())
}

pub fn render_records(records: &[&ExpenseRecord], total: usize) -> String {
    let mut lines = vec![
        String::new(),
        format!("🧾 Receipts ({} of {})", records.len(), total),
        "   ─────────────────────────────────────────────────────────".to_string(),
    ];
    if records.is_empty() {
        lines.push("   No matching receipts.".to_string());
        return lines.join("\n");
    }

    for record in records {
        let date = record
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "   {:>6}  {:10}  {:24} {:>10.2}  {:8}  {}",
            record.id,
            date,
            truncate(&record.merchant_name, 24),
            record.amount,
            record.category_or_other().label(),
            record.status
        ));
    }

    lines.join("\n")
}
