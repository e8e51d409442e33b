//! Calendar aggregates
//!
//! A month view is a fixed 6x7 grid starting on Sunday, padded with the tail
//! of the previous month and the head of the next.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{ExpenseRecord, MonthKey};
use crate::store::RecordSnapshot;

use super::aggregate::sum_amounts;
use super::types::CalendarDay;

/// Cells in a month grid (six weeks)
pub const GRID_CELLS: usize = 42;

/// A month grid with per-day totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub month: MonthKey,
    pub days: Vec<CalendarDay>,
}

impl CalendarMonth {
    pub fn build(month: MonthKey, snapshot: &RecordSnapshot, today: NaiveDate) -> Result<Self> {
        let first = month
            .first_day()
            .ok_or_else(|| Error::InvalidData(format!("month {} is out of range", month)))?;

        let mut per_day: HashMap<NaiveDate, f64> = HashMap::new();
        for record in snapshot {
            if let Some(date) = record.date {
                *per_day.entry(date).or_insert(0.0) += record.amount;
            }
        }

        let leading = first.weekday().num_days_from_sunday() as i64;
        let start = first - Duration::days(leading);

        let days = (0..GRID_CELLS as i64)
            .map(|offset| {
                let date = start + Duration::days(offset);
                let total = per_day.get(&date).copied();
                CalendarDay {
                    day: date.day(),
                    date,
                    in_month: month.contains(date),
                    is_today: date == today,
                    has_data: total.is_some(),
                    total: total.unwrap_or(0.0),
                }
            })
            .collect();

        Ok(Self { month, days })
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days.iter().find(|d| d.date == date)
    }
}

/// Records on one selected day and their total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayExpenses {
    pub date: NaiveDate,
    pub records: Vec<ExpenseRecord>,
    pub total: f64,
}

impl DayExpenses {
    pub fn collect(snapshot: &RecordSnapshot, date: NaiveDate) -> Self {
        let records = snapshot.on_date(date);
        let total = sum_amounts(records.iter().copied());
        Self {
            date,
            records: records.into_iter().cloned().collect(),
            total,
        }
    }
}
