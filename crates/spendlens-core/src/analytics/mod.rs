//! Analytics Engine - derived views over a record snapshot
//!
//! Every computation here is synchronous and read-only over an immutable
//! snapshot; the same input always produces the same output.
//!
//! ## Views
//!
//! - **Aggregation** - sums, monthly bucketing, category shares, dashboard
//!   headline figures
//! - **Clustering** - amount-band spend patterns (local fallback) and the
//!   remote clustering transform
//! - **Trend** - fixed monthly window with a two-point forecast
//! - **Budget** - three-state utilization signal and budget roll-ups
//! - **Calendar** - month grid with per-day totals

pub mod aggregate;
pub mod budget;
pub mod calendar;
pub mod clustering;
pub mod trend;
pub mod types;

pub use aggregate::{
    category_breakdown, group_totals, month_over_month, percent_of, records_in_month,
    sum_amounts, totals_by_category,
};
pub use budget::{evaluate_budget, BudgetEvaluator};
pub use calendar::{CalendarMonth, DayExpenses};
pub use clustering::{cluster_locally, AmountBand};
pub use trend::{linear_forecast, local_trend, month_window, HeightScale};
pub use types::{
    BudgetLevel, BudgetOverview, BudgetStatus, CalendarDay, CategoryBudget, CategoryShare,
    ClusterBucket, ClusterReport, DashboardSummary, TrendPoint, TrendSeries,
};
