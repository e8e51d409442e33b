//! Display model types
//!
//! These shapes are identical whichever path (remote, local fallback)
//! produced them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Category, MonthKey};

/// Cosmetic palette shared by cluster buckets
pub const CLUSTER_COLORS: [&str; 4] = ["#409EFF", "#67C23A", "#E6A23C", "#F56C6C"];

/// A named group of records with a shared spend-pattern label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterBucket {
    /// Ordinal index in discovery order
    pub index: usize,
    pub label: String,
    pub color: String,
    pub count: usize,
    pub avg_amount: f64,
    /// Share of all input records, 0-100
    pub percent: u32,
    pub description: String,
}

/// One clustering run, ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterReport {
    pub cluster_count: usize,
    pub data_count: usize,
    /// Label of the bucket with the most members ("-" when there are none)
    pub main_pattern: String,
    pub buckets: Vec<ClusterBucket>,
    pub suggestions: Vec<String>,
    /// Optional explanation from the remote service
    pub narrative: Option<String>,
}

/// One monthly aggregate or forecast point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub month: MonthKey,
    pub label: String,
    pub amount: f64,
    /// Bar height within the configured visual range
    pub height: u32,
    pub is_forecast: bool,
}

/// Monthly trend; only the last point may be a forecast
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendSeries {
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    pub fn observations(&self) -> impl Iterator<Item = &TrendPoint> {
        self.points.iter().filter(|p| !p.is_forecast)
    }

    pub fn forecast(&self) -> Option<&TrendPoint> {
        self.points.last().filter(|p| p.is_forecast)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Budget utilization severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    Normal,
    Warning,
    Exceeded,
}

impl BudgetLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetLevel::Normal => "normal",
            BudgetLevel::Warning => "warning",
            BudgetLevel::Exceeded => "exceeded",
        }
    }

    /// Human-readable state name
    pub fn label(&self) -> &'static str {
        match self {
            BudgetLevel::Normal => "Normal",
            BudgetLevel::Warning => "Warning",
            BudgetLevel::Exceeded => "Exceeded",
        }
    }
}

impl fmt::Display for BudgetLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BudgetLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(BudgetLevel::Normal),
            "warning" => Ok(BudgetLevel::Warning),
            "exceeded" => Ok(BudgetLevel::Exceeded),
            _ => Err(format!("Unknown budget level: {}", s)),
        }
    }
}

/// Derived utilization state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub text: String,
    pub level: BudgetLevel,
    /// used / limit * 100, or 0 without a limit
    pub percent: f64,
}

impl BudgetStatus {
    pub fn new(level: BudgetLevel, percent: f64) -> Self {
        Self {
            text: level.label().to_string(),
            level,
            percent,
        }
    }
}

/// One category budget row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub id: Option<i64>,
    pub category: Category,
    pub limit_amount: f64,
    pub used_amount: f64,
    pub percent: u32,
    pub is_over: bool,
    pub status: BudgetStatus,
}

/// All budgets rolled up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetOverview {
    pub total_limit: f64,
    pub total_used: f64,
    pub remaining: f64,
    pub usage_percent: u32,
    pub status: BudgetStatus,
    pub categories: Vec<CategoryBudget>,
}

/// One category's slice of total spend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: Category,
    pub amount: f64,
    pub percent: u32,
}

/// Headline dashboard figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_amount: f64,
    pub total_count: usize,
    pub month: MonthKey,
    pub month_amount: f64,
    pub previous_month_amount: f64,
    /// Month-over-month change in percent (one decimal)
    pub month_rate: f64,
    pub top_category: Option<Category>,
    pub top_percent: u32,
}

/// One cell in a month calendar grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub day: u32,
    pub date: chrono::NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub has_data: bool,
    pub total: f64,
}
