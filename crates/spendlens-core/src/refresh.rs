//! Refresh coordinator
//!
//! Every user-triggered refresh takes a `RefreshToken` from a monotonic
//! counter. Results are committed to the shared view only while their token
//! is still the newest issued for that view, so a slow earlier refresh can
//! never overwrite a later one no matter which finishes first.
//!
//! Within a refresh, remote calls run concurrently and all local
//! computation happens synchronously on a snapshot captured once for the
//! cycle.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analytics::aggregate::category_breakdown;
use crate::analytics::budget::BudgetEvaluator;
use crate::analytics::types::{
    BudgetOverview, BudgetStatus, CategoryShare, ClusterReport, DashboardSummary, TrendSeries,
};
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::models::{BudgetLine, ExpenseRecord, MonthKey};
use crate::reconcile::{
    reconcile_clustering, reconcile_trend, remote_clustering_only, remote_trend_only,
    ResolutionPath, Resolved,
};
use crate::remote::AnalyticsSource;
use crate::store::RecordSnapshot;

/// Identifies one refresh cycle; later-issued tokens compare greater
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RefreshToken(u64);

impl fmt::Display for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The independently refreshed views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshKind {
    Dashboard,
    Clusters,
}

impl RefreshKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshKind::Dashboard => "dashboard",
            RefreshKind::Clusters => "clusters",
        }
    }
}

/// Everything the dashboard shows, computed from one snapshot
///
/// Figures derived from records are `None` when the records fetch failed,
/// and budget figures are `None` when the budgets fetch failed. A failed
/// fetch is never presented as zero spend.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub token: RefreshToken,
    pub snapshot: Option<RecordSnapshot>,
    /// Records left out of the snapshot for a negative or non-finite amount
    pub invalid_records: usize,
    pub summary: Option<DashboardSummary>,
    pub categories: Vec<CategoryShare>,
    pub budget: Option<BudgetOverview>,
    /// Current month's spend against the total configured limit
    pub monthly_budget: Option<BudgetStatus>,
    /// `None` when the remote trend failed with no records to fall back on
    pub trend: Option<Resolved<TrendSeries>>,
}

impl DashboardView {
    pub fn records_unavailable(&self) -> bool {
        self.snapshot.is_none()
    }

    pub fn budgets_unavailable(&self) -> bool {
        self.budget.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ClusterView {
    pub token: RefreshToken,
    /// `None` when the remote clustering failed with no records to fall back on
    pub resolved: Option<Resolved<ClusterReport>>,
}

/// Latest committed state of every view
#[derive(Debug, Clone, Default)]
pub struct AnalyticsView {
    pub dashboard: Option<DashboardView>,
    pub clusters: Option<ClusterView>,
}

#[derive(Debug, Default)]
struct SessionState {
    issued: u64,
    latest_dashboard: Option<RefreshToken>,
    latest_clusters: Option<RefreshToken>,
    view: AnalyticsView,
}

impl SessionState {
    fn latest(&self, kind: RefreshKind) -> Option<RefreshToken> {
        match kind {
            RefreshKind::Dashboard => self.latest_dashboard,
            RefreshKind::Clusters => self.latest_clusters,
        }
    }
}

/// Owns the view state and the refresh token counter
pub struct AnalyticsSession {
    config: AnalyticsConfig,
    evaluator: BudgetEvaluator,
    state: Mutex<SessionState>,
}

impl AnalyticsSession {
    pub fn new(config: AnalyticsConfig) -> Self {
        let evaluator = BudgetEvaluator::new(&config.budget);
        Self {
            config,
            evaluator,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // View state stays consistent even if a holder panicked mid-read
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a new token, superseding any in-flight refresh of this view
    pub fn begin(&self, kind: RefreshKind) -> RefreshToken {
        let mut state = self.lock();
        state.issued += 1;
        let token = RefreshToken(state.issued);
        match kind {
            RefreshKind::Dashboard => state.latest_dashboard = Some(token),
            RefreshKind::Clusters => state.latest_clusters = Some(token),
        }
        debug!(token = %token, view = kind.as_str(), "Refresh started");
        token
    }

    /// Whether `token` is still the newest issued for `kind`
    pub fn is_current(&self, kind: RefreshKind, token: RefreshToken) -> bool {
        self.lock().latest(kind) == Some(token)
    }

    /// Apply a dashboard result; returns false if it was stale and discarded
    pub fn commit_dashboard(&self, view: DashboardView) -> bool {
        let mut state = self.lock();
        if state.latest(RefreshKind::Dashboard) != Some(view.token) {
            warn!(token = %view.token, view = "dashboard", "Discarding stale refresh result");
            return false;
        }
        state.view.dashboard = Some(view);
        true
    }

    /// Apply a clustering result; returns false if it was stale and discarded
    pub fn commit_clusters(&self, view: ClusterView) -> bool {
        let mut state = self.lock();
        if state.latest(RefreshKind::Clusters) != Some(view.token) {
            warn!(token = %view.token, view = "clusters", "Discarding stale refresh result");
            return false;
        }
        state.view.clusters = Some(view);
        true
    }

    /// Merge a late narrative into the committed remote clustering
    ///
    /// Applies only when the committed view came from the remote path of the
    /// same refresh. Primary fields are left untouched.
    pub fn merge_narrative(&self, token: RefreshToken, narrative: String) -> bool {
        if narrative.trim().is_empty() {
            return false;
        }
        let mut state = self.lock();
        if state.latest(RefreshKind::Clusters) != Some(token) {
            debug!(token = %token, "Dropping narrative for superseded refresh");
            return false;
        }
        let Some(clusters) = state.view.clusters.as_mut() else {
            return false;
        };
        if clusters.token != token {
            return false;
        }
        let Some(resolved) = clusters.resolved.as_mut() else {
            return false;
        };
        if resolved.path != ResolutionPath::Remote {
            return false;
        }
        match resolved.value_mut() {
            Some(report) => {
                report.narrative = Some(narrative);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the current view state
    pub fn view(&self) -> AnalyticsView {
        self.lock().view.clone()
    }

    /// Fetch records, budgets and trend concurrently and rebuild the dashboard
    ///
    /// Returns the token and whether the result was committed.
    pub async fn refresh_dashboard<S>(&self, source: &S, today: NaiveDate) -> (RefreshToken, bool)
    where
        S: AnalyticsSource + ?Sized,
    {
        let token = self.begin(RefreshKind::Dashboard);

        let (records, budgets, trend) = tokio::join!(
            source.fetch_records(),
            source.fetch_budgets(),
            source.fetch_trend()
        );

        let capture = capture_snapshot(records);
        let budgets = budget_lines(budgets);
        let month = MonthKey::of(today);

        let trend = match &capture {
            Some(capture) => Some(reconcile_trend(
                trend,
                &capture.snapshot,
                month,
                &self.config.trend,
            )),
            None => remote_trend_only(trend, &self.config.trend),
        };
        let budget = budgets.as_deref().map(|lines| self.evaluator.overview(lines));
        let monthly_budget = match (&capture, &budget) {
            (Some(capture), Some(budget)) => Some(self.evaluator.monthly_check(
                &capture.snapshot,
                month,
                budget.total_limit,
            )),
            _ => None,
        };

        let view = DashboardView {
            token,
            invalid_records: capture.as_ref().map_or(0, |c| c.invalid),
            summary: capture
                .as_ref()
                .map(|c| DashboardSummary::compute(&c.snapshot, today, &self.config)),
            categories: capture
                .as_ref()
                .map(|c| category_breakdown(&c.snapshot, &self.config))
                .unwrap_or_default(),
            snapshot: capture.map(|c| c.snapshot),
            budget,
            monthly_budget,
            trend,
        };

        let trend_path = view.trend.as_ref().map_or("unavailable", |t| t.path.as_str());
        let records = view.snapshot.as_ref().map_or(0, RecordSnapshot::len);
        let records_available = !view.records_unavailable();
        let budgets_available = !view.budgets_unavailable();
        let committed = self.commit_dashboard(view);
        if committed {
            info!(
                token = %token,
                source = source.name(),
                records,
                records_available,
                budgets_available,
                trend = trend_path,
                "Dashboard refreshed"
            );
        }
        (token, committed)
    }

    /// Resolve the clustering view, then merge the narrative if it arrived
    ///
    /// The primary result is committed as soon as it resolves; the narrative
    /// fetch runs alongside and can only add to it.
    pub async fn refresh_clusters<S>(&self, source: &S) -> (RefreshToken, bool)
    where
        S: AnalyticsSource + ?Sized,
    {
        let token = self.begin(RefreshKind::Clusters);

        let primary = async {
            let (clustering, records) =
                tokio::join!(source.fetch_clustering(), source.fetch_records());
            let config = &self.config.clustering;
            let resolved = match capture_snapshot(records) {
                Some(capture) => Some(reconcile_clustering(
                    clustering,
                    None,
                    &capture.snapshot,
                    config,
                )),
                None => remote_clustering_only(clustering, config),
            };
            let path = resolved.as_ref().map_or("unavailable", |r| r.path.as_str());
            let committed = self.commit_clusters(ClusterView { token, resolved });
            if committed {
                info!(
                    token = %token,
                    source = source.name(),
                    path,
                    "Clusters refreshed"
                );
            }
            committed
        };

        let (committed, narrative) = tokio::join!(primary, source.fetch_clustering_narrative());

        match narrative {
            Ok(text) if committed => {
                self.merge_narrative(token, text);
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "Clustering narrative unavailable"),
        }

        (token, committed)
    }
}

/// A cycle's snapshot and how many fetched records it left out
struct Capture {
    snapshot: RecordSnapshot,
    invalid: usize,
}

/// Build the cycle's snapshot; `None` when the records fetch failed
///
/// Records with a negative or non-finite amount would fail snapshot
/// validation as a whole, so they are counted and left out instead.
fn capture_snapshot(records: Result<Vec<ExpenseRecord>>) -> Option<Capture> {
    let mut records = match records {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "Failed to fetch records");
            return None;
        }
    };

    let before = records.len();
    records.retain(|r| r.amount >= 0.0 && r.amount.is_finite());
    let invalid = before - records.len();
    if invalid > 0 {
        warn!(dropped = invalid, "Dropped records with invalid amounts");
    }

    match RecordSnapshot::new(records) {
        Ok(snapshot) => Some(Capture { snapshot, invalid }),
        Err(e) => {
            warn!(error = %e, "Rejected record snapshot");
            None
        }
    }
}

/// Fetched budget lines; `None` when the budgets fetch failed
fn budget_lines(budgets: Result<Vec<BudgetLine>>) -> Option<Vec<BudgetLine>> {
    budgets
        .map_err(|e| warn!(error = %e, "Failed to fetch budgets"))
        .ok()
}
