//! Budget utilization
//!
//! `percent = used / limit * 100` (0 when no limit is configured), then
//! `percent >= exceeded` is Exceeded, `percent >= warning` is Warning and
//! anything else is Normal. A zero limit is never treated as exceeded.

use crate::config::BudgetConfig;
use crate::models::{BudgetLine, Category, MonthKey};
use crate::store::RecordSnapshot;

use super::aggregate::{percent_of, sum_amounts, total_of};
use super::types::{BudgetLevel, BudgetOverview, BudgetStatus, CategoryBudget};

/// Classifies spend against a limit
#[derive(Debug, Clone)]
pub struct BudgetEvaluator {
    warning_percent: f64,
    exceeded_percent: f64,
}

impl Default for BudgetEvaluator {
    fn default() -> Self {
        Self::new(&BudgetConfig::default())
    }
}

impl BudgetEvaluator {
    pub fn new(config: &BudgetConfig) -> Self {
        Self {
            warning_percent: config.warning_percent,
            exceeded_percent: config.exceeded_percent,
        }
    }

    pub fn evaluate(&self, used_amount: f64, limit_amount: f64) -> BudgetStatus {
        let percent = if limit_amount > 0.0 {
            used_amount / limit_amount * 100.0
        } else {
            0.0
        };

        let level = if limit_amount <= 0.0 {
            BudgetLevel::Normal
        } else if percent >= self.exceeded_percent {
            BudgetLevel::Exceeded
        } else if percent >= self.warning_percent {
            BudgetLevel::Warning
        } else {
            BudgetLevel::Normal
        };

        BudgetStatus::new(level, percent)
    }

    /// Roll configured budgets up into totals plus per-category rows
    pub fn overview(&self, lines: &[BudgetLine]) -> BudgetOverview {
        let total_limit = total_of(lines.iter().map(|l| l.limit_amount));
        let total_used = total_of(lines.iter().map(|l| l.used_amount));

        let categories = lines
            .iter()
            .map(|line| CategoryBudget {
                id: line.id,
                category: line.category.unwrap_or(Category::Other),
                limit_amount: line.limit_amount,
                used_amount: line.used_amount,
                percent: percent_of(line.used_amount, line.limit_amount),
                is_over: line.used_amount > line.limit_amount,
                status: self.evaluate(line.used_amount, line.limit_amount),
            })
            .collect();

        BudgetOverview {
            total_limit,
            total_used,
            remaining: (total_limit - total_used).max(0.0),
            usage_percent: percent_of(total_used, total_limit),
            status: self.evaluate(total_used, total_limit),
            categories,
        }
    }

    /// A month's spend from the snapshot against a monthly limit
    pub fn monthly_check(
        &self,
        snapshot: &RecordSnapshot,
        month: MonthKey,
        limit_amount: f64,
    ) -> BudgetStatus {
        self.evaluate(sum_amounts(snapshot.in_month(month)), limit_amount)
    }
}

/// Classify with the default thresholds (80% warning, 100% exceeded)
pub fn evaluate_budget(used_amount: f64, limit_amount: f64) -> BudgetStatus {
    BudgetEvaluator::default().evaluate(used_amount, limit_amount)
}
