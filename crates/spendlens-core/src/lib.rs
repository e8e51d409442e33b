//! Spendlens Core Library
//!
//! Client-side analytics over captured expense receipts:
//! - Record snapshots and aggregation primitives
//! - Rule-based clustering and trend fallbacks
//! - Budget utilization signals
//! - Calendar aggregates
//! - Pluggable remote analytics sources (HTTP, offline, mock)
//! - Remote/local reconciliation with explicit "not enough data" results
//! - Refresh coordination with monotonic refresh tokens

pub mod analytics;
pub mod config;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod refresh;
pub mod remote;
pub mod session;
pub mod store;

/// Test utilities including a mock analytics API server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analytics::{
    BudgetEvaluator, BudgetLevel, BudgetOverview, BudgetStatus, CalendarMonth, ClusterReport,
    DashboardSummary, DayExpenses, TrendSeries,
};
pub use config::AnalyticsConfig;
pub use error::{Error, Result};
pub use models::{BudgetLine, Category, ExpenseRecord, MonthKey, RecordStatus};
pub use reconcile::{Outcome, ResolutionPath, Resolved};
pub use refresh::{AnalyticsSession, AnalyticsView, RefreshKind, RefreshToken};
pub use remote::{AnalyticsSource, ApiClient, HttpSource, MockSource, OfflineSource};
pub use session::SessionHandle;
pub use store::{RecordFilter, RecordSnapshot};
