//! Aggregation primitives
//!
//! Pure functions over record sequences. Empty input yields zero sums and
//! empty maps, never an error.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::AnalyticsConfig;
use crate::models::{Category, ExpenseRecord, MonthKey};
use crate::store::RecordSnapshot;

use super::types::{CategoryShare, DashboardSummary};

/// Records whose date falls in `month`, in input order
pub fn records_in_month<'a, I>(records: I, month: MonthKey) -> Vec<&'a ExpenseRecord>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    records
        .into_iter()
        .filter(|r| r.date.is_some_and(|d| month.contains(d)))
        .collect()
}

/// Sum of values, starting from positive zero
///
/// `Sum for f64` starts at `-0.0`, which would print as `-0.00` for an
/// empty input.
pub fn total_of<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().fold(0.0, |acc, v| acc + v)
}

/// Sum of amounts
pub fn sum_amounts<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    total_of(records.into_iter().map(|r| r.amount))
}

/// Sum amounts per key extracted from each record
pub fn group_totals<'a, I, K, F>(records: I, key: F) -> BTreeMap<K, f64>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
    K: Ord,
    F: Fn(&ExpenseRecord) -> K,
{
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(key(record)).or_insert(0.0) += record.amount;
    }
    totals
}

/// Sum amounts per category (unset category counts as Other)
pub fn totals_by_category<'a, I>(records: I) -> BTreeMap<Category, f64>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    group_totals(records, ExpenseRecord::category_or_other)
}

/// Integer percentage of `part` in `total`, rounded half-up (0 without a total)
pub fn percent_of(part: f64, total: f64) -> u32 {
    if total > 0.0 {
        (part / total * 100.0).round().max(0.0) as u32
    } else {
        0
    }
}

/// Month-over-month change in percent, rounded to one decimal
///
/// A previous month with no spend reports 100 when the current month has
/// any, else 0.
pub fn month_over_month(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        ((current - previous) / previous * 1000.0).round() / 10.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Category shares sorted by amount (largest first, ties in display order)
pub fn category_breakdown<'a, I>(records: I, config: &AnalyticsConfig) -> Vec<CategoryShare>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let totals = totals_by_category(records);
    let total = total_of(totals.values().copied());

    let mut shares: Vec<CategoryShare> = totals
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category,
            amount,
            percent: percent_of(amount, total),
        })
        .collect();

    shares.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                config
                    .display_rank(a.category)
                    .cmp(&config.display_rank(b.category))
            })
    });
    shares
}

impl DashboardSummary {
    /// Headline figures for the month containing `today`
    pub fn compute(snapshot: &RecordSnapshot, today: NaiveDate, config: &AnalyticsConfig) -> Self {
        let month = MonthKey::of(today);
        let month_amount = sum_amounts(snapshot.in_month(month));
        let previous_month_amount = sum_amounts(snapshot.in_month(month.prev()));

        let breakdown = category_breakdown(snapshot, config);
        let top = breakdown.first();

        Self {
            total_amount: sum_amounts(snapshot),
            total_count: snapshot.len(),
            month,
            month_amount,
            previous_month_amount,
            month_rate: month_over_month(month_amount, previous_month_amount),
            top_category: top.map(|s| s.category),
            top_percent: top.map(|s| s.percent).unwrap_or(0),
        }
    }
}
