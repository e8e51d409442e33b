//! Record store
//!
//! A `RecordSnapshot` is the immutable, ordered input to every analytics
//! computation. It is captured once per refresh cycle; later saves or
//! deletions only show up in the next snapshot.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::{Category, ExpenseRecord, MonthKey};

/// Immutable, cheaply clonable sequence of expense records
#[derive(Debug, Clone, Default)]
pub struct RecordSnapshot {
    records: Arc<[ExpenseRecord]>,
}

impl RecordSnapshot {
    /// Capture a snapshot, rejecting records with negative amounts
    pub fn new(records: Vec<ExpenseRecord>) -> Result<Self> {
        if let Some(bad) = records
            .iter()
            .find(|r| r.amount < 0.0 || !r.amount.is_finite())
        {
            return Err(Error::InvalidData(format!(
                "record {} has invalid amount {}",
                bad.id, bad.amount
            )));
        }
        Ok(Self {
            records: records.into(),
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExpenseRecord> {
        self.records.iter()
    }

    /// Records dated within the given month
    pub fn in_month(&self, month: MonthKey) -> Vec<&ExpenseRecord> {
        self.records
            .iter()
            .filter(|r| r.date.is_some_and(|d| month.contains(d)))
            .collect()
    }

    /// Records dated on exactly the given day
    pub fn on_date(&self, date: NaiveDate) -> Vec<&ExpenseRecord> {
        self.records
            .iter()
            .filter(|r| r.date == Some(date))
            .collect()
    }

    /// Records matching a list filter, in snapshot order
    pub fn filter(&self, filter: &RecordFilter) -> Vec<&ExpenseRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }
}

impl<'a> IntoIterator for &'a RecordSnapshot {
    type Item = &'a ExpenseRecord;
    type IntoIter = std::slice::Iter<'a, ExpenseRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Keyword and category filter for record lists
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Case-insensitive match against merchant or item name
    pub keyword: Option<String>,
    pub category: Option<Category>,
}

impl RecordFilter {
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        if let Some(category) = self.category {
            if record.category != Some(category) {
                return false;
            }
        }

        match self.keyword.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(kw) => {
                let kw = kw.to_lowercase();
                record.merchant_name.to_lowercase().contains(&kw)
                    || record
                        .item_name
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase().contains(&kw))
            }
        }
    }
}
