//! CLI command tests
//!
//! This module contains all tests for the CLI commands. Every command runs
//! against an offline snapshot, so no network is involved.

use std::path::PathBuf;

use chrono::NaiveDate;
use spendlens_core::{AnalyticsConfig, ApiClient, Category, MockSource, MonthKey, ResolutionPath};
use tempfile::TempDir;

use crate::commands::{self, truncate};

const SNAPSHOT: &str = r#"[
    {"id": 1, "merchantName": "Coffee House", "itemName": "Latte", "date": "2026-03-02", "amount": 28, "category": "餐饮美食", "status": 2},
    {"id": 2, "merchantName": "City Metro", "date": "2026-03-03", "amount": 4, "category": "交通出行", "status": 1},
    {"id": 3, "merchantName": "Paper Co", "date": "2026-03-06 09:30:00", "amount": 160, "category": "办公耗材"},
    {"id": 4, "merchantName": "Mobile Carrier", "date": "2026-02-25", "amount": 120, "category": "通讯网络"},
    {"id": 5, "merchantName": "Computer Store", "date": "2026-02-08", "amount": 2600, "category": "电子设备"},
    {"id": 6, "merchantName": "Noodle Bar", "date": "2026-01-19", "amount": 48, "category": "餐饮美食"}
]"#;

fn write_snapshot(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("records.json");
    std::fs::write(&path, content).unwrap();
    path
}

fn offline_source(dir: &TempDir) -> ApiClient {
    let path = write_snapshot(dir, SNAPSHOT);
    commands::build_source(&AnalyticsConfig::default(), Some(&path), None).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 20).unwrap()
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("this is a long merchant", 10), "this is...");
    assert_eq!(truncate("餐饮美食", 4), "餐饮美食");
}

#[test]
fn test_parse_month() {
    assert_eq!(
        commands::parse_month("2026-03").unwrap(),
        MonthKey::new(2026, 3).unwrap()
    );
    assert!(commands::parse_month("2026-13").is_err());
    assert!(commands::parse_month("March").is_err());
}

#[test]
fn test_parse_day() {
    assert_eq!(
        commands::parse_day("2026-03-02").unwrap(),
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    );
    assert!(commands::parse_day("2026-02-30").is_err());
}

#[test]
fn test_build_filter() {
    let filter = commands::build_filter(Some("coffee"), Some("dining")).unwrap();
    assert_eq!(filter.keyword.as_deref(), Some("coffee"));
    assert_eq!(filter.category, Some(Category::Dining));

    let filter = commands::build_filter(None, Some("交通出行")).unwrap();
    assert_eq!(filter.category, Some(Category::Transport));

    assert!(commands::build_filter(None, Some("Groceries")).is_err());
}

// ========== Config Tests ==========

#[test]
fn test_load_config_with_api_url_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("analytics.toml");
    std::fs::write(&path, "[remote]\nbase_url = \"http://from-file:1\"\n").unwrap();

    let config = commands::load_config(Some(&path), Some("http://from-flag:2/")).unwrap();
    assert_eq!(config.remote.base_url, "http://from-flag:2");
}

#[test]
fn test_load_config_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("analytics.toml");
    std::fs::write(&path, "[trend]\nwindow_months = 0\n").unwrap();

    assert!(commands::load_config(Some(&path), None).is_err());
}

#[test]
fn test_build_source_missing_snapshot() {
    let result = commands::build_source(
        &AnalyticsConfig::default(),
        Some(std::path::Path::new("/nonexistent/records.json")),
        None,
    );
    assert!(result.is_err());
}

#[test]
fn test_build_source_http() {
    let source =
        commands::build_source(&AnalyticsConfig::default(), None, Some("token")).unwrap();
    assert!(matches!(source, ApiClient::Http(_)));
}

// ========== Offline Refresh Tests ==========

#[tokio::test]
async fn test_offline_refresh_uses_local_paths() {
    let dir = TempDir::new().unwrap();
    let source = offline_source(&dir);

    let view = commands::refresh_dashboard(&source, &AnalyticsConfig::default(), today())
        .await
        .unwrap();

    assert_eq!(view.snapshot.as_ref().unwrap().len(), 6);
    assert_eq!(view.summary.as_ref().unwrap().month_amount, 192.0);
    assert_eq!(view.trend.as_ref().unwrap().path, ResolutionPath::Local);
    assert!(view.budget.as_ref().unwrap().categories.is_empty());
}

// ========== Rendered Output Tests ==========

#[tokio::test]
async fn test_dashboard_output() {
    let dir = TempDir::new().unwrap();
    let source = offline_source(&dir);
    let view = commands::refresh_dashboard(&source, &AnalyticsConfig::default(), today())
        .await
        .unwrap();

    let text = commands::render_dashboard(&view);
    assert!(text.contains("Spending Dashboard (2026-03)"));
    // March: 28 + 4 + 160
    assert!(text.contains("192.00"));
    assert!(text.contains("(6 receipts)"));
    assert!(text.contains("Monthly budget: Normal"));

    let json = commands::dashboard_json(&view);
    assert_eq!(json["summary"]["month_amount"], 192.0);
    assert_eq!(json["recordsAvailable"], true);
    assert_eq!(json["invalidRecords"], 0);
}

#[tokio::test]
async fn test_empty_snapshot_prints_positive_zero() {
    let dir = TempDir::new().unwrap();
    let path = write_snapshot(&dir, "[]");
    let source = commands::build_source(&AnalyticsConfig::default(), Some(&path), None).unwrap();
    let view = commands::refresh_dashboard(&source, &AnalyticsConfig::default(), today())
        .await
        .unwrap();

    let text = commands::render_dashboard(&view);
    assert!(text.contains("0.00"));
    assert!(!text.contains("-0.00"));

    let json = commands::dashboard_json(&view).to_string();
    assert!(!json.contains("-0.0"));
}

#[tokio::test]
async fn test_unavailable_records_are_not_shown_as_zero() {
    let source = ApiClient::Mock(MockSource::unavailable());
    let view = commands::refresh_dashboard(&source, &AnalyticsConfig::default(), today())
        .await
        .unwrap();

    let text = commands::render_dashboard(&view);
    assert!(text.contains("Receipts could not be loaded"));
    assert!(text.contains("Monthly budget: unavailable"));
    assert!(!text.contains("0.00"));

    let json = commands::dashboard_json(&view);
    assert!(json["summary"].is_null());
    assert_eq!(json["recordsAvailable"], false);
    assert_eq!(json["budgetsAvailable"], false);

    assert!(commands::render_budget(&view).contains("Budgets could not be loaded"));
    assert!(commands::render_trend(&view, &AnalyticsConfig::default().trend)
        .contains("Trend unavailable"));

    let config = AnalyticsConfig::default();
    let result = commands::cmd_records(&source, &config, today(), None, None, false).await;
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("could not be loaded"));
}

#[tokio::test]
async fn test_clusters_json_output() {
    let dir = TempDir::new().unwrap();
    let source = offline_source(&dir);
    let view = commands::refresh_clusters(&source, &AnalyticsConfig::default())
        .await
        .unwrap();

    let json = commands::clusters_json(&view);
    // Which path produced the result is not part of the output
    assert!(json.get("path").is_none());
    assert_eq!(json["outcome"]["state"], "ready");
    assert_eq!(json["outcome"]["data_count"], 6);

    // 3 small (28, 4, 48), 2 mid (160, 120), 1 large (2600) of 6
    let percents: Vec<u64> = json["outcome"]["buckets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["percent"].as_u64().unwrap())
        .collect();
    assert_eq!(percents, vec![50, 33, 17]);
    assert_eq!(percents.iter().sum::<u64>(), 100);

    let text = commands::render_clusters(&view);
    assert!(text.contains("3 clusters over 6 receipts"));
    assert!(text.contains("main pattern: Small purchases"));
    assert!(!text.contains("source"));
    assert!(!text.contains("local"));
}

#[tokio::test]
async fn test_clusters_insufficient_data_message() {
    let dir = TempDir::new().unwrap();
    let path = write_snapshot(
        &dir,
        r#"[{"id": 1, "merchantName": "Solo", "date": "2026-03-01", "amount": 10}]"#,
    );
    let source = commands::build_source(&AnalyticsConfig::default(), Some(&path), None).unwrap();
    let view = commands::refresh_clusters(&source, &AnalyticsConfig::default())
        .await
        .unwrap();

    let text = commands::render_clusters(&view);
    assert!(text.contains("Not enough data: clustering needs at least 5 receipts, found 1."));

    let json = commands::clusters_json(&view);
    assert_eq!(json["outcome"]["state"], "insufficient_data");
    assert_eq!(json["outcome"]["required"], 5);
    assert_eq!(json["outcome"]["actual"], 1);
}

#[tokio::test]
async fn test_trend_json_marks_only_the_forecast() {
    let dir = TempDir::new().unwrap();
    let source = offline_source(&dir);
    let config = AnalyticsConfig::default();
    let view = commands::refresh_dashboard(&source, &config, today())
        .await
        .unwrap();

    let json = commands::trend_json(&view);
    assert!(json.get("path").is_none());
    let points = json["outcome"]["points"].as_array().unwrap();
    assert_eq!(points.len(), 7);
    let flags: Vec<bool> = points
        .iter()
        .map(|p| p["is_forecast"].as_bool().unwrap())
        .collect();
    assert_eq!(flags, vec![false, false, false, false, false, false, true]);
    assert_eq!(points[6]["month"], "2026-04");
    // 192 + (192 - 2720) is floored at zero
    assert_eq!(points[6]["amount"], 0.0);

    let text = commands::render_trend(&view, &config.trend);
    assert!(text.contains("2026-04"));
    assert!(text.contains("(forecast)"));
    assert!(!text.contains("source"));
}

#[tokio::test]
async fn test_budget_warning_and_exceeded_output() {
    let dir = TempDir::new().unwrap();
    let path = write_snapshot(
        &dir,
        r#"{
            "records": [
                {"id": 1, "merchantName": "Coffee House", "date": "2026-03-02", "amount": 28, "category": "餐饮美食"}
            ],
            "budgets": [
                {"id": 1, "category": "餐饮美食", "limitAmount": 100, "usedAmount": 85},
                {"id": 2, "category": "通讯网络", "limitAmount": 100, "usedAmount": 135}
            ]
        }"#,
    );
    let source = commands::build_source(&AnalyticsConfig::default(), Some(&path), None).unwrap();
    let view = commands::refresh_dashboard(&source, &AnalyticsConfig::default(), today())
        .await
        .unwrap();

    let text = commands::render_budget(&view);
    let dining = text.lines().find(|l| l.contains("餐饮美食")).unwrap();
    assert!(dining.contains("85%"));
    assert!(dining.contains("Warning"));
    assert!(!dining.contains("⚠️"));
    let telecom = text.lines().find(|l| l.contains("通讯网络")).unwrap();
    assert!(telecom.contains("135%"));
    assert!(telecom.contains("Exceeded ⚠️"));
    // 220 of 200 overall
    assert!(text.contains("Remaining 0.00 (110%, Exceeded)"));

    let json = commands::budget_json(&view);
    assert_eq!(json["overview"]["categories"][0]["status"]["level"], "warning");
    assert_eq!(json["overview"]["categories"][1]["status"]["level"], "exceeded");
    assert_eq!(json["overview"]["categories"][1]["is_over"], true);
    // 28 spent this month against the 200 total limit
    assert_eq!(json["monthlyBudget"]["level"], "normal");
}

#[tokio::test]
async fn test_budget_without_lines() {
    let dir = TempDir::new().unwrap();
    let source = offline_source(&dir);
    let view = commands::refresh_dashboard(&source, &AnalyticsConfig::default(), today())
        .await
        .unwrap();

    assert!(commands::render_budget(&view).contains("No budgets configured."));
}

#[tokio::test]
async fn test_records_output() {
    let dir = TempDir::new().unwrap();
    let source = offline_source(&dir);
    let view = commands::refresh_dashboard(&source, &AnalyticsConfig::default(), today())
        .await
        .unwrap();
    let snapshot = view.snapshot.unwrap();

    let filter = commands::build_filter(Some("metro"), None).unwrap();
    let records = snapshot.filter(&filter);
    let text = commands::render_records(&records, snapshot.len());
    assert!(text.contains("Receipts (1 of 6)"));
    assert!(text.contains("City Metro"));
    assert!(!text.contains("Coffee House"));

    let none = commands::render_records(&[], snapshot.len());
    assert!(none.contains("No matching receipts."));
}

#[tokio::test]
async fn test_calendar_output() {
    let dir = TempDir::new().unwrap();
    let source = offline_source(&dir);
    let view = commands::refresh_dashboard(&source, &AnalyticsConfig::default(), today())
        .await
        .unwrap();
    let snapshot = view.snapshot.unwrap();

    let month = MonthKey::new(2026, 3).unwrap();
    let calendar = spendlens_core::CalendarMonth::build(month, &snapshot, today()).unwrap();
    let day = spendlens_core::DayExpenses::collect(&snapshot, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());

    let text = commands::render_calendar(&calendar, Some(&day));
    assert!(text.contains("📅 2026-03"));
    assert!(text.contains("20*"));
    assert!(text.contains("2026-03-02 · total 28.00"));
    assert!(text.contains("Coffee House"));
}

// ========== Command Tests ==========

#[tokio::test]
async fn test_cmd_dashboard() {
    let dir = TempDir::new().unwrap();
    let source = offline_source(&dir);
    let config = AnalyticsConfig::default();

    assert!(commands::cmd_dashboard(&source, &config, today(), false)
        .await
        .is_ok());
    assert!(commands::cmd_dashboard(&source, &config, today(), true)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_cmd_calendar() {
    let dir = TempDir::new().unwrap();
    let source = offline_source(&dir);
    let config = AnalyticsConfig::default();

    assert!(
        commands::cmd_calendar(&source, &config, today(), Some("2026-02"), None, true)
            .await
            .is_ok()
    );
    let result = commands::cmd_calendar(&source, &config, today(), Some("bad"), None, false).await;
    assert!(result.unwrap_err().to_string().contains("Invalid month"));
}

#[tokio::test]
async fn test_cmd_records_rejects_unknown_category() {
    let dir = TempDir::new().unwrap();
    let source = offline_source(&dir);
    let config = AnalyticsConfig::default();

    let result = commands::cmd_records(&source, &config, today(), None, Some("pets"), false).await;
    assert!(result.is_err());
}
