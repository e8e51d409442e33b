//! Integration tests for spendlens-core
//!
//! These tests exercise the full fetch → reconcile → commit workflow
//! through the public API with scripted sources.

use std::time::Duration;

use chrono::NaiveDate;
use spendlens_core::{
    analytics::{cluster_locally, local_trend},
    models::{BudgetLine, Category, ExpenseRecord, MonthKey},
    reconcile::{reconcile_clustering, Outcome, ResolutionPath},
    refresh::{AnalyticsSession, RefreshKind},
    remote::{ApiClient, MockSource, RemoteCluster, RemoteClustering, RemoteTrend},
    AnalyticsConfig, BudgetLevel, Error, RecordSnapshot,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Eight receipts across three months and all three amount bands
fn receipts() -> Vec<ExpenseRecord> {
    vec![
        ExpenseRecord::new(1, "Coffee House", 28.0)
            .with_date(date(2026, 3, 2))
            .with_category(Category::Dining),
        ExpenseRecord::new(2, "City Metro", 4.0)
            .with_date(date(2026, 3, 3))
            .with_category(Category::Transport),
        ExpenseRecord::new(3, "Paper Co", 160.0)
            .with_date(date(2026, 3, 6))
            .with_category(Category::OfficeSupplies),
        ExpenseRecord::new(4, "Noodle Bar", 48.0)
            .with_date(date(2026, 3, 12))
            .with_category(Category::Dining),
        ExpenseRecord::new(5, "Mobile Carrier", 120.0)
            .with_date(date(2026, 2, 25))
            .with_category(Category::Telecom),
        ExpenseRecord::new(6, "Computer Store", 2600.0)
            .with_date(date(2026, 2, 8))
            .with_category(Category::Electronics),
        ExpenseRecord::new(7, "Taxi", 40.0)
            .with_date(date(2026, 1, 19))
            .with_category(Category::Transport),
        ExpenseRecord::new(8, "Printer Ink", 300.0).with_date(date(2026, 1, 5)),
    ]
}

fn today() -> NaiveDate {
    date(2026, 3, 20)
}

fn remote_clustering() -> RemoteClustering {
    RemoteClustering {
        clusters: vec![
            RemoteCluster {
                label: Some("Routine".into()),
                count: Some(5),
                avg_amount: Some(48.0),
                description: None,
            },
            RemoteCluster {
                label: Some("Equipment".into()),
                count: Some(3),
                avg_amount: Some(1000.0),
                description: None,
            },
        ],
        k: Some(2),
        total_points: Some(8),
    }
}

// =============================================================================
// Dashboard Refresh
// =============================================================================

#[tokio::test]
async fn test_full_dashboard_refresh_remote_path() {
    let session = AnalyticsSession::new(AnalyticsConfig::default());
    let source = ApiClient::Mock(
        MockSource::unavailable()
            .with_records(receipts())
            .with_trend(RemoteTrend {
                months: vec!["2026-01".into(), "2026-02".into(), "2026-03".into()],
                amounts: vec![340.0, 2720.0, 240.0],
                forecast: Some(180.0),
                forecast_label: Some("2026-04 (预测)".into()),
            })
            .with_budgets(vec![BudgetLine {
                id: Some(1),
                category: Some(Category::Dining),
                limit_amount: 100.0,
                used_amount: 76.0,
            }]),
    );

    let (_, committed) = session.refresh_dashboard(&source, today()).await;
    assert!(committed);

    let dashboard = session.view().dashboard.unwrap();
    let summary = dashboard.summary.unwrap();
    assert_eq!(summary.total_count, 8);
    assert_eq!(summary.total_amount, 3300.0);
    // March: 28 + 4 + 160 + 48
    assert_eq!(summary.month_amount, 240.0);
    assert_eq!(summary.previous_month_amount, 2720.0);
    assert_eq!(summary.top_category, Some(Category::Electronics));

    let trend = dashboard.trend.unwrap();
    assert_eq!(trend.path, ResolutionPath::Remote);
    let trend = trend.value().unwrap();
    assert_eq!(trend.points.len(), 4);
    assert_eq!(trend.forecast().unwrap().month, MonthKey::new(2026, 4).unwrap());

    // 240 spent against a 100 limit this month
    assert_eq!(dashboard.monthly_budget.unwrap().level, BudgetLevel::Exceeded);
    assert_eq!(
        dashboard.budget.unwrap().categories[0].status.level,
        BudgetLevel::Normal
    );
}

#[tokio::test]
async fn test_dashboard_with_everything_down() {
    let session = AnalyticsSession::new(AnalyticsConfig::default());
    let (_, committed) = session
        .refresh_dashboard(&MockSource::unavailable(), today())
        .await;
    assert!(committed);

    // Failed fetches are reported, not shown as zero spend
    let dashboard = session.view().dashboard.unwrap();
    assert!(dashboard.records_unavailable());
    assert!(dashboard.budgets_unavailable());
    assert!(dashboard.summary.is_none());
    assert!(dashboard.monthly_budget.is_none());
    assert!(dashboard.trend.is_none());
}

#[tokio::test]
async fn test_records_down_budgets_up() {
    let session = AnalyticsSession::new(AnalyticsConfig::default());
    let source = MockSource::unavailable().with_budgets(vec![BudgetLine {
        id: Some(1),
        category: Some(Category::Dining),
        limit_amount: 100.0,
        used_amount: 85.0,
    }]);

    session.refresh_dashboard(&source, today()).await;
    let dashboard = session.view().dashboard.unwrap();

    assert!(dashboard.records_unavailable());
    assert!(dashboard.summary.is_none());
    assert!(dashboard.categories.is_empty());
    // The month's spend is unknown, so there is no monthly signal
    assert!(dashboard.monthly_budget.is_none());

    let budget = dashboard.budget.unwrap();
    assert_eq!(budget.total_used, 85.0);
    assert_eq!(budget.status.level, BudgetLevel::Warning);
}

#[tokio::test]
async fn test_no_receipts_is_zero_spend() {
    let session = AnalyticsSession::new(AnalyticsConfig::default());
    let source = MockSource::unavailable()
        .with_records(Vec::new())
        .with_budgets(Vec::new());
    session.refresh_dashboard(&source, today()).await;

    // An empty record list is a valid result, not insufficient data
    let dashboard = session.view().dashboard.unwrap();
    let summary = dashboard.summary.unwrap();
    assert_eq!(summary.total_amount, 0.0);
    assert!(!summary.total_amount.is_sign_negative());
    assert!(!summary.month_amount.is_sign_negative());
    let trend = dashboard.trend.unwrap();
    assert_eq!(trend.path, ResolutionPath::Local);
    let trend = trend.value().unwrap();
    assert!(trend.points.iter().all(|p| p.amount == 0.0 && p.height == 10));
}

// =============================================================================
// Reconciliation
// =============================================================================

#[tokio::test]
async fn test_failed_remote_clustering_equals_direct_fallback() {
    let config = AnalyticsConfig::default();
    let session = AnalyticsSession::new(config.clone());
    let source = MockSource::unavailable()
        .with_records(receipts())
        .with_narrative("never merged into a local result");

    session.refresh_clusters(&source).await;
    let committed = session.view().clusters.unwrap().resolved.unwrap();

    let direct = cluster_locally(&receipts(), &config.clustering).unwrap();
    assert_eq!(committed.path, ResolutionPath::Local);
    assert_eq!(committed.outcome, Outcome::Ready(direct));
}

#[tokio::test]
async fn test_malformed_remote_trend_equals_direct_fallback() {
    let config = AnalyticsConfig::default();
    let session = AnalyticsSession::new(config.clone());
    let source = MockSource::unavailable()
        .with_records(receipts())
        .with_malformed_trend();

    session.refresh_dashboard(&source, today()).await;
    let trend = session.view().dashboard.unwrap().trend.unwrap();

    let direct = local_trend(&receipts(), MonthKey::of(today()), &config.trend);
    assert_eq!(trend.path, ResolutionPath::Local);
    assert_eq!(trend.value(), Some(&direct));
}

#[tokio::test]
async fn test_remote_clustering_with_narrative() {
    let session = AnalyticsSession::new(AnalyticsConfig::default());
    let source = MockSource::unavailable()
        .with_clustering(remote_clustering())
        .with_narrative("Routine spend dominates.");

    session.refresh_clusters(&source).await;
    let clusters = session.view().clusters.unwrap().resolved.unwrap();
    let report = clusters.value().unwrap();

    assert_eq!(clusters.path, ResolutionPath::Remote);
    assert_eq!(report.main_pattern, "Routine");
    assert_eq!(report.buckets[0].percent, 63); // 5 / 8 = 62.5
    assert_eq!(report.narrative.as_deref(), Some("Routine spend dominates."));
}

#[tokio::test]
async fn test_too_few_records_reports_insufficient_data() {
    let session = AnalyticsSession::new(AnalyticsConfig::default());
    let source = MockSource::unavailable().with_records(receipts()[..4].to_vec());

    session.refresh_clusters(&source).await;
    let clusters = session.view().clusters.unwrap().resolved.unwrap();

    assert_eq!(clusters.path, ResolutionPath::Empty);
    assert!(clusters.is_insufficient());
    assert_eq!(
        clusters.outcome,
        Outcome::InsufficientData {
            required: 5,
            actual: 4
        }
    );
}

#[test]
fn test_local_fallback_counts_every_record() {
    let snapshot = RecordSnapshot::new(receipts()).unwrap();
    let resolved = reconcile_clustering(
        Err(Error::MalformedRemoteResult("no clusters".into())),
        None,
        &snapshot,
        &AnalyticsConfig::default().clustering,
    );
    let report = resolved.value().unwrap();
    let counted: usize = report.buckets.iter().map(|b| b.count).sum();
    assert_eq!(counted, snapshot.len());
}

// =============================================================================
// Refresh Ordering
// =============================================================================

#[tokio::test]
async fn test_later_triggered_refresh_wins_when_earlier_finishes_last() {
    let session = AnalyticsSession::new(AnalyticsConfig::default());

    let slow = MockSource::unavailable()
        .with_records(receipts()[..2].to_vec())
        .with_delay(Duration::from_millis(200));
    let fast = MockSource::unavailable().with_records(receipts());

    let (first, second) = tokio::join!(session.refresh_dashboard(&slow, today()), async {
        // Let the slow refresh take its token first
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.refresh_dashboard(&fast, today()).await
    });

    let (first_token, first_committed) = first;
    let (second_token, second_committed) = second;

    assert!(first_token < second_token);
    assert!(second_committed);
    assert!(!first_committed);

    let dashboard = session.view().dashboard.unwrap();
    assert_eq!(dashboard.token, second_token);
    assert_eq!(dashboard.summary.unwrap().total_count, 8);
}

#[tokio::test]
async fn test_cluster_refreshes_out_of_order() {
    let session = AnalyticsSession::new(AnalyticsConfig::default());

    let slow_remote = MockSource::unavailable()
        .with_clustering(remote_clustering())
        .with_narrative("stale narrative")
        .with_delay(Duration::from_millis(200));
    let fast_local = MockSource::unavailable().with_records(receipts());

    let (first, second) = tokio::join!(session.refresh_clusters(&slow_remote), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.refresh_clusters(&fast_local).await
    });

    assert!(!first.1);
    assert!(second.1);

    let clusters = session.view().clusters.unwrap();
    assert_eq!(clusters.token, second.0);
    let resolved = clusters.resolved.unwrap();
    assert_eq!(resolved.path, ResolutionPath::Local);
    assert_eq!(resolved.value().unwrap().narrative, None);
}

#[tokio::test]
async fn test_dashboard_and_clusters_tokens_are_independent() {
    let session = AnalyticsSession::new(AnalyticsConfig::default());
    let source = MockSource::unavailable().with_records(receipts());

    let (dashboard_token, _) = session.refresh_dashboard(&source, today()).await;
    let (clusters_token, _) = session.refresh_clusters(&source).await;

    assert!(dashboard_token < clusters_token);
    assert!(session.is_current(RefreshKind::Dashboard, dashboard_token));
    assert!(session.is_current(RefreshKind::Clusters, clusters_token));
}

// =============================================================================
// Determinism
// =============================================================================

#[tokio::test]
async fn test_repeated_refreshes_of_same_snapshot_agree() {
    let mut reversed = receipts();
    reversed.reverse();
    let record_sets = vec![
        ("all receipts", receipts()),
        ("reversed", reversed),
        ("first five", receipts()[..5].to_vec()),
        ("single month", receipts()[..4].to_vec()),
    ];

    for (name, records) in record_sets {
        let source = MockSource::unavailable()
            .with_records(records)
            .with_budgets(Vec::new());
        let session = AnalyticsSession::new(AnalyticsConfig::default());

        session.refresh_dashboard(&source, today()).await;
        session.refresh_clusters(&source).await;
        let first = session.view();

        for _ in 0..3 {
            session.refresh_dashboard(&source, today()).await;
            session.refresh_clusters(&source).await;
            let again = session.view();

            let (a, b) = (
                first.dashboard.as_ref().unwrap(),
                again.dashboard.as_ref().unwrap(),
            );
            assert_eq!(a.summary, b.summary, "{}", name);
            assert_eq!(a.categories, b.categories, "{}", name);
            assert_eq!(a.trend, b.trend, "{}", name);
            assert_eq!(a.monthly_budget, b.monthly_budget, "{}", name);
            assert_eq!(
                first.clusters.as_ref().unwrap().resolved,
                again.clusters.as_ref().unwrap().resolved,
                "{}",
                name
            );
        }
    }
}
