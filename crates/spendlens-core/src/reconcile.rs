//! Source reconciliation
//!
//! Each analytics view resolves to exactly one of three paths:
//!
//! - **Remote**: the remote result was well formed and is transformed into
//!   the display model. A narrative fetched alongside it may be merged in.
//! - **Local**: the remote call failed or returned an unusable payload, so
//!   the local fallback runs over the record snapshot.
//! - **Empty**: the local fallback lacks the input it needs and reports
//!   insufficient data instead of inventing a result.
//!
//! Fields from the two sources are never mixed. A local result is exactly
//! what running the fallback directly on the same snapshot produces.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::analytics::clustering::cluster_locally;
use crate::analytics::trend::local_trend;
use crate::analytics::types::{ClusterReport, TrendSeries};
use crate::config::{ClusteringConfig, TrendConfig};
use crate::error::{Error, Result};
use crate::models::MonthKey;
use crate::remote::{AnalyticsSource, RemoteClustering, RemoteTrend};
use crate::store::RecordSnapshot;

/// Which source produced a view
///
/// Kept for logging and tests; display models never carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPath {
    Remote,
    Local,
    Empty,
}

impl ResolutionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionPath::Remote => "remote",
            ResolutionPath::Local => "local",
            ResolutionPath::Empty => "empty",
        }
    }
}

impl fmt::Display for ResolutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A display model, or an explicit "not enough data" signal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ready(T),
    InsufficientData { required: usize, actual: usize },
}

/// Result of reconciling one view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<T> {
    #[serde(skip)]
    pub path: ResolutionPath,
    pub outcome: Outcome<T>,
}

impl<T> Resolved<T> {
    fn remote(value: T) -> Self {
        Self {
            path: ResolutionPath::Remote,
            outcome: Outcome::Ready(value),
        }
    }

    fn local(value: T) -> Self {
        Self {
            path: ResolutionPath::Local,
            outcome: Outcome::Ready(value),
        }
    }

    fn empty(required: usize, actual: usize) -> Self {
        Self {
            path: ResolutionPath::Empty,
            outcome: Outcome::InsufficientData { required, actual },
        }
    }

    pub fn value(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Ready(value) => Some(value),
            Outcome::InsufficientData { .. } => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match &mut self.outcome {
            Outcome::Ready(value) => Some(value),
            Outcome::InsufficientData { .. } => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self.outcome, Outcome::InsufficientData { .. })
    }
}

/// Pick the clustering view from a remote result and the record snapshot
///
/// The narrative is only merged on the remote path.
pub fn reconcile_clustering(
    remote: Result<RemoteClustering>,
    narrative: Option<String>,
    snapshot: &RecordSnapshot,
    config: &ClusteringConfig,
) -> Resolved<ClusterReport> {
    match remote.and_then(|payload| ClusterReport::from_remote(&payload, config)) {
        Ok(mut report) => {
            report.narrative = narrative.filter(|n| !n.trim().is_empty());
            debug!(buckets = report.buckets.len(), "Using remote clustering");
            Resolved::remote(report)
        }
        Err(e) => {
            warn!(error = %e, "Remote clustering unavailable, using local fallback");
            local_clustering(snapshot, config)
        }
    }
}

/// Remote clustering alone, for a cycle whose records could not be fetched
///
/// With no records there is nothing to fall back on, so a failed remote
/// leaves the view unavailable instead of reporting zero receipts.
pub fn remote_clustering_only(
    remote: Result<RemoteClustering>,
    config: &ClusteringConfig,
) -> Option<Resolved<ClusterReport>> {
    match remote.and_then(|payload| ClusterReport::from_remote(&payload, config)) {
        Ok(report) => Some(Resolved::remote(report)),
        Err(e) => {
            warn!(error = %e, "Remote clustering unavailable and no records to fall back on");
            None
        }
    }
}

fn local_clustering(snapshot: &RecordSnapshot, config: &ClusteringConfig) -> Resolved<ClusterReport> {
    match cluster_locally(snapshot.records(), config) {
        Ok(report) => Resolved::local(report),
        Err(Error::InsufficientData { required, actual }) => {
            debug!(required, actual, "Not enough records to cluster");
            Resolved::empty(required, actual)
        }
        Err(e) => {
            warn!(error = %e, "Local clustering failed");
            Resolved::empty(config.min_records, snapshot.len())
        }
    }
}

/// Pick the trend view from a remote result and the record snapshot
///
/// The local trend always has a window to show, so this never resolves
/// to the empty path.
pub fn reconcile_trend(
    remote: Result<RemoteTrend>,
    snapshot: &RecordSnapshot,
    current: MonthKey,
    config: &TrendConfig,
) -> Resolved<TrendSeries> {
    match remote.and_then(|payload| TrendSeries::from_remote(&payload, config)) {
        Ok(series) => {
            debug!(points = series.points.len(), "Using remote trend");
            Resolved::remote(series)
        }
        Err(e) => {
            warn!(error = %e, "Remote trend unavailable, using local fallback");
            Resolved::local(local_trend(snapshot.records(), current, config))
        }
    }
}

/// Remote trend alone, for a cycle whose records could not be fetched
pub fn remote_trend_only(
    remote: Result<RemoteTrend>,
    config: &TrendConfig,
) -> Option<Resolved<TrendSeries>> {
    match remote.and_then(|payload| TrendSeries::from_remote(&payload, config)) {
        Ok(series) => Some(Resolved::remote(series)),
        Err(e) => {
            warn!(error = %e, "Remote trend unavailable and no records to fall back on");
            None
        }
    }
}

/// Fetch clustering and its narrative concurrently, then reconcile
///
/// A failed narrative never affects the primary result.
pub async fn resolve_clustering<S>(
    source: &S,
    snapshot: &RecordSnapshot,
    config: &ClusteringConfig,
) -> Resolved<ClusterReport>
where
    S: AnalyticsSource + ?Sized,
{
    let (primary, narrative) = tokio::join!(
        source.fetch_clustering(),
        source.fetch_clustering_narrative()
    );
    let narrative = narrative
        .map_err(|e| debug!(error = %e, "Clustering narrative unavailable"))
        .ok();
    reconcile_clustering(primary, narrative, snapshot, config)
}

/// Fetch the remote trend, then reconcile
pub async fn resolve_trend<S>(
    source: &S,
    snapshot: &RecordSnapshot,
    current: MonthKey,
    config: &TrendConfig,
) -> Resolved<TrendSeries>
where
    S: AnalyticsSource + ?Sized,
{
    reconcile_trend(source.fetch_trend().await, snapshot, current, config)
}
