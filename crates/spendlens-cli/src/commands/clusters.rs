//! Clusters command

use anyhow::Result;
use serde_json::{json, Value};
use spendlens_core::reconcile::Outcome;
use spendlens_core::refresh::ClusterView;
use spendlens_core::{AnalyticsConfig, ApiClient};

use super::{print_json, refresh_clusters};

pub async fn cmd_clusters(source: &ApiClient, config: &AnalyticsConfig, as_json: bool) -> Result<()> {
    let view = refresh_clusters(source, config).await?;

    if as_json {
        return print_json(clusters_json(&view));
    }

    println!("{}", render_clusters(&view));
    Ok(())
}

/// Cluster result, or `null` when it could not be produced at all
pub fn clusters_json(view: &ClusterView) -> Value {
    json!(view.resolved)
}

pub fn render_clusters(view: &ClusterView) -> String {
    let mut lines = vec![
        String::new(),
        "🧩 Spending Patterns".to_string(),
        "   ─────────────────────────────────────────────────────────".to_string(),
    ];

    let Some(resolved) = &view.resolved else {
        lines.push("   Spending patterns are unavailable: receipts could not be loaded.".to_string());
        return lines.join("\n");
    };

    let report = match &resolved.outcome {
        Outcome::Ready(report) => report,
        Outcome::InsufficientData { required, actual } => {
            lines.push(format!(
                "   Not enough data: clustering needs at least {} receipts, found {}.",
                required, actual
            ));
            return lines.join("\n");
        }
    };

    lines.push(format!(
        "   {} clusters over {} receipts · main pattern: {}",
        report.cluster_count, report.data_count, report.main_pattern
    ));
    lines.push(String::new());
    for bucket in &report.buckets {
        lines.push(format!(
            "   {}. {:20} {:>4} receipts  avg {:>10.2}  {:>3}%",
            bucket.index + 1,
            bucket.label,
            bucket.count,
            bucket.avg_amount,
            bucket.percent
        ));
        lines.push(format!("      {}", bucket.description));
    }

    if let Some(narrative) = &report.narrative {
        lines.push(String::new());
        lines.push(format!("   💬 {}", narrative));
    }

    lines.push(String::new());
    lines.push("   Suggestions:".to_string());
    for suggestion in &report.suggestions {
        lines.push(format!("   • {}", suggestion));
    }

    lines.join("\n")
}
