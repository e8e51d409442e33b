//! Remote payload types
//!
//! One normalized shape per operation. Envelope unwrapping and shape
//! sniffing happen in the transport, never in the analytics code.

use serde::{Deserialize, Serialize};

/// One cluster as reported by the remote clustering service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCluster {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub avg_amount: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Remote clustering result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteClustering {
    #[serde(default)]
    pub clusters: Vec<RemoteCluster>,
    #[serde(default)]
    pub k: Option<usize>,
    #[serde(default)]
    pub total_points: Option<usize>,
}

/// Remote trend result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTrend {
    #[serde(default)]
    pub months: Vec<String>,
    #[serde(default)]
    pub amounts: Vec<f64>,
    #[serde(default, alias = "prediction")]
    pub forecast: Option<f64>,
    #[serde(default, alias = "nextMonthLabel")]
    pub forecast_label: Option<String>,
}
