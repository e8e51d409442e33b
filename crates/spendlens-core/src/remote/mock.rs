//! Mock source for testing
//!
//! Each operation answers with a scripted reply. Anything not scripted fails
//! as if the remote API were down, so a bare `MockSource::default()` behaves
//! like an unreachable server.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{BudgetLine, ExpenseRecord};

use super::types::{RemoteClustering, RemoteTrend};
use super::AnalyticsSource;

/// Scripted answer for one operation
#[derive(Debug, Clone)]
pub enum MockReply<T> {
    Ok(T),
    /// Fail with `RemoteUnavailable`
    Fail,
    /// Fail with `MalformedRemoteResult`
    Malformed,
}

impl<T> Default for MockReply<T> {
    fn default() -> Self {
        MockReply::Fail
    }
}

impl<T: Clone> MockReply<T> {
    fn resolve(&self, operation: &str) -> Result<T> {
        match self {
            MockReply::Ok(value) => Ok(value.clone()),
            MockReply::Fail => Err(Error::RemoteUnavailable(format!(
                "mock {} unavailable",
                operation
            ))),
            MockReply::Malformed => Err(Error::MalformedRemoteResult(format!(
                "mock {} malformed",
                operation
            ))),
        }
    }
}

/// Mock analytics source
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    pub records: MockReply<Vec<ExpenseRecord>>,
    pub clustering: MockReply<RemoteClustering>,
    pub narrative: MockReply<String>,
    pub trend: MockReply<RemoteTrend>,
    pub budgets: MockReply<Vec<BudgetLine>>,
    /// Applied before every reply
    pub delay: Option<Duration>,
}

impl MockSource {
    /// Source whose every call fails
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, records: Vec<ExpenseRecord>) -> Self {
        self.records = MockReply::Ok(records);
        self
    }

    pub fn with_clustering(mut self, clustering: RemoteClustering) -> Self {
        self.clustering = MockReply::Ok(clustering);
        self
    }

    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = MockReply::Ok(narrative.into());
        self
    }

    pub fn with_trend(mut self, trend: RemoteTrend) -> Self {
        self.trend = MockReply::Ok(trend);
        self
    }

    pub fn with_budgets(mut self, budgets: Vec<BudgetLine>) -> Self {
        self.budgets = MockReply::Ok(budgets);
        self
    }

    pub fn with_malformed_clustering(mut self) -> Self {
        self.clustering = MockReply::Malformed;
        self
    }

    pub fn with_malformed_trend(mut self) -> Self {
        self.trend = MockReply::Malformed;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl AnalyticsSource for MockSource {
    async fn fetch_records(&self) -> Result<Vec<ExpenseRecord>> {
        self.pause().await;
        self.records.resolve("records")
    }

    async fn fetch_clustering(&self) -> Result<RemoteClustering> {
        self.pause().await;
        self.clustering.resolve("clustering")
    }

    async fn fetch_clustering_narrative(&self) -> Result<String> {
        self.pause().await;
        self.narrative.resolve("narrative")
    }

    async fn fetch_trend(&self) -> Result<RemoteTrend> {
        self.pause().await;
        self.trend.resolve("trend")
    }

    async fn fetch_budgets(&self) -> Result<Vec<BudgetLine>> {
        self.pause().await;
        self.budgets.resolve("budgets")
    }

    fn name(&self) -> &str {
        "mock"
    }
}
