//! Remote analytics sources
//!
//! The analytics engine consumes five operations from the remote API. Every
//! non-success outcome (network error, non-2xx status, malformed payload,
//! expired session) comes back as an `Err` that the reconciliation policy
//! treats uniformly as "remote unavailable".
//!
//! # Architecture
//!
//! - `AnalyticsSource` trait: the operations the engine consumes
//! - `ApiClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Implementations: `HttpSource` (reqwest), `OfflineSource` (local JSON
//!   snapshot, no remote analytics), `MockSource` (scripted, for tests)
//!
//! # Configuration
//!
//! - `SPENDLENS_API_URL`: base URL of the remote API (overrides config)
//! - `SPENDLENS_TOKEN`: session credential forwarded on every request

mod http;
mod mock;
mod offline;
pub mod types;

pub use http::HttpSource;
pub use mock::{MockReply, MockSource};
pub use offline::OfflineSource;
pub use types::{RemoteCluster, RemoteClustering, RemoteTrend};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{BudgetLine, ExpenseRecord};

/// Operations the analytics engine consumes from the remote API
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    /// Fetch the current list of expense records
    async fn fetch_records(&self) -> Result<Vec<ExpenseRecord>>;

    /// Fetch the remote clustering result
    async fn fetch_clustering(&self) -> Result<RemoteClustering>;

    /// Fetch the narrative explanation for the clustering (best-effort)
    async fn fetch_clustering_narrative(&self) -> Result<String>;

    /// Fetch the remote monthly trend with its forecast
    async fn fetch_trend(&self) -> Result<RemoteTrend>;

    /// Fetch configured budgets with their used amounts
    async fn fetch_budgets(&self) -> Result<Vec<BudgetLine>>;

    /// Short name for logging
    fn name(&self) -> &str;
}

/// Concrete source enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ApiClient {
    /// Remote HTTP API
    Http(HttpSource),
    /// Records from a local file; every remote analytics call fails
    Offline(OfflineSource),
    /// Scripted source for testing
    Mock(MockSource),
}

impl ApiClient {
    /// Build an HTTP client from config and `SPENDLENS_TOKEN`
    pub fn http_from_env(config: &crate::config::RemoteConfig) -> Result<Self> {
        HttpSource::new(config, crate::session::SessionHandle::from_env()).map(ApiClient::Http)
    }

    /// Load an offline snapshot from a JSON file
    pub fn offline(path: &std::path::Path) -> Result<Self> {
        OfflineSource::from_file(path).map(ApiClient::Offline)
    }

    fn inner(&self) -> &dyn AnalyticsSource {
        match self {
            ApiClient::Http(s) => s,
            ApiClient::Offline(s) => s,
            ApiClient::Mock(s) => s,
        }
    }
}

#[async_trait]
impl AnalyticsSource for ApiClient {
    async fn fetch_records(&self) -> Result<Vec<ExpenseRecord>> {
        self.inner().fetch_records().await
    }

    async fn fetch_clustering(&self) -> Result<RemoteClustering> {
        self.inner().fetch_clustering().await
    }

    async fn fetch_clustering_narrative(&self) -> Result<String> {
        self.inner().fetch_clustering_narrative().await
    }

    async fn fetch_trend(&self) -> Result<RemoteTrend> {
        self.inner().fetch_trend().await
    }

    async fn fetch_budgets(&self) -> Result<Vec<BudgetLine>> {
        self.inner().fetch_budgets().await
    }

    fn name(&self) -> &str {
        self.inner().name()
    }
}
