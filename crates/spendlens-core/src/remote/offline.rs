//! Offline source backed by a JSON snapshot file
//!
//! Records come from disk; every remote analytics operation reports the
//! remote as unavailable so the local fallbacks take over.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{BudgetLine, ExpenseRecord};

use super::types::{RemoteClustering, RemoteTrend};
use super::AnalyticsSource;

#[derive(Debug, Clone)]
pub struct OfflineSource {
    path: PathBuf,
    records: Arc<Vec<ExpenseRecord>>,
    budgets: Arc<Vec<BudgetLine>>,
}

/// Snapshot file layout: either a bare record array or an object with
/// `records` and optional `budgets`
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Records(Vec<ExpenseRecord>),
    Full {
        records: Vec<ExpenseRecord>,
        #[serde(default)]
        budgets: Vec<BudgetLine>,
    },
}

impl OfflineSource {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let (records, budgets) = match serde_json::from_str::<SnapshotFile>(&content)? {
            SnapshotFile::Records(records) => (records, Vec::new()),
            SnapshotFile::Full { records, budgets } => (records, budgets),
        };

        tracing::debug!(
            path = %path.display(),
            records = records.len(),
            budgets = budgets.len(),
            "Loaded offline snapshot"
        );

        Ok(Self {
            path: path.to_path_buf(),
            records: Arc::new(records),
            budgets: Arc::new(budgets),
        })
    }

    fn unavailable<T>(&self, operation: &str) -> Result<T> {
        Err(Error::RemoteUnavailable(format!(
            "offline snapshot {} has no {}",
            self.path.display(),
            operation
        )))
    }
}

#[async_trait]
impl AnalyticsSource for OfflineSource {
    async fn fetch_records(&self) -> Result<Vec<ExpenseRecord>> {
        Ok(self.records.as_ref().clone())
    }

    async fn fetch_clustering(&self) -> Result<RemoteClustering> {
        self.unavailable("clustering")
    }

    async fn fetch_clustering_narrative(&self) -> Result<String> {
        self.unavailable("clustering narrative")
    }

    async fn fetch_trend(&self) -> Result<RemoteTrend> {
        self.unavailable("trend")
    }

    async fn fetch_budgets(&self) -> Result<Vec<BudgetLine>> {
        Ok(self.budgets.as_ref().clone())
    }

    fn name(&self) -> &str {
        "offline"
    }
}
