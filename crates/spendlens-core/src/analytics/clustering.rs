//! Spend-pattern clustering
//!
//! The local fallback is a rule-based stand-in for the remote k-means
//! service: records are split into three fixed amount bands (low, mid,
//! high), empty bands are dropped and each remaining band becomes a bucket.
//! Remote results are transformed into the same `ClusterReport` shape.

use crate::config::ClusteringConfig;
use crate::error::{Error, Result};
use crate::models::ExpenseRecord;
use crate::remote::RemoteClustering;

use super::aggregate::percent_of;
use super::types::{ClusterBucket, ClusterReport, CLUSTER_COLORS};

/// Amount band used by the local fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountBand {
    Low,
    Mid,
    High,
}

impl AmountBand {
    /// Bands in discovery order
    pub fn all() -> &'static [AmountBand] {
        &[AmountBand::Low, AmountBand::Mid, AmountBand::High]
    }

    pub fn of(amount: f64, config: &ClusteringConfig) -> Self {
        if amount < config.low_band_max {
            AmountBand::Low
        } else if amount < config.high_band_min {
            AmountBand::Mid
        } else {
            AmountBand::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AmountBand::Low => "Small purchases",
            AmountBand::Mid => "Mid-size purchases",
            AmountBand::High => "Large purchases",
        }
    }

    /// Colors are tied to the band, not the bucket position
    fn color(&self) -> &'static str {
        match self {
            AmountBand::Low => CLUSTER_COLORS[0],
            AmountBand::Mid => CLUSTER_COLORS[1],
            AmountBand::High => CLUSTER_COLORS[2],
        }
    }
}

/// Describe a bucket by its mean amount
pub fn describe_average(avg_amount: f64, config: &ClusteringConfig) -> String {
    match AmountBand::of(avg_amount, config) {
        AmountBand::Low => format!(
            "Average under {:.0} per transaction, likely routine spend such as meals or transport",
            config.low_band_max
        ),
        AmountBand::Mid => format!(
            "Average {:.0}-{:.0} per transaction, likely office supplies or shopping",
            config.low_band_max, config.high_band_min
        ),
        AmountBand::High => format!(
            "Average over {:.0} per transaction, likely equipment or large service purchases",
            config.high_band_min
        ),
    }
}

/// Group records into amount-band buckets
///
/// Fails with `InsufficientData` when there are fewer than
/// `config.min_records` records.
pub fn cluster_locally(records: &[ExpenseRecord], config: &ClusteringConfig) -> Result<ClusterReport> {
    if records.len() < config.min_records {
        return Err(Error::InsufficientData {
            required: config.min_records,
            actual: records.len(),
        });
    }

    let total = records.len();
    let mut buckets = Vec::new();

    for band in AmountBand::all() {
        let members: Vec<&ExpenseRecord> = records
            .iter()
            .filter(|r| AmountBand::of(r.amount, config) == *band)
            .collect();
        if members.is_empty() {
            continue;
        }

        let count = members.len();
        let avg_amount = members.iter().map(|r| r.amount).sum::<f64>() / count as f64;

        buckets.push(ClusterBucket {
            index: buckets.len(),
            label: band.label().to_string(),
            color: band.color().to_string(),
            count,
            avg_amount,
            percent: percent_of(count as f64, total as f64),
            description: describe_average(avg_amount, config),
        });
    }

    tracing::debug!(
        records = total,
        buckets = buckets.len(),
        "Local clustering complete"
    );

    Ok(ClusterReport {
        cluster_count: buckets.len(),
        data_count: total,
        main_pattern: dominant_label(&buckets),
        suggestions: suggestions_for(&buckets),
        buckets,
        narrative: None,
    })
}

impl ClusterReport {
    /// Transform a remote clustering payload into the display model
    ///
    /// An empty cluster list is treated as malformed.
    pub fn from_remote(remote: &RemoteClustering, config: &ClusteringConfig) -> Result<Self> {
        if remote.clusters.is_empty() {
            return Err(Error::MalformedRemoteResult(
                "clustering payload has no clusters".into(),
            ));
        }

        let total_points = remote.total_points.unwrap_or(0);
        let buckets: Vec<ClusterBucket> = remote
            .clusters
            .iter()
            .enumerate()
            .map(|(idx, c)| {
                let count = c.count.unwrap_or(0);
                let avg_amount = c.avg_amount.unwrap_or(0.0);
                ClusterBucket {
                    index: idx,
                    label: c
                        .label
                        .clone()
                        .filter(|l| !l.trim().is_empty())
                        .unwrap_or_else(|| format!("Cluster {}", idx + 1)),
                    color: CLUSTER_COLORS[idx % CLUSTER_COLORS.len()].to_string(),
                    count,
                    avg_amount,
                    percent: percent_of(count as f64, total_points as f64),
                    description: c
                        .description
                        .clone()
                        .filter(|d| !d.trim().is_empty())
                        .unwrap_or_else(|| describe_average(avg_amount, config)),
                }
            })
            .collect();

        Ok(Self {
            cluster_count: remote.k.filter(|k| *k > 0).unwrap_or(buckets.len()),
            data_count: total_points,
            main_pattern: dominant_label(&buckets),
            suggestions: suggestions_for(&buckets),
            buckets,
            narrative: None,
        })
    }
}

/// Label of the bucket with the most members; ties keep the earlier bucket
pub fn dominant_label(buckets: &[ClusterBucket]) -> String {
    let mut best: Option<&ClusterBucket> = None;
    for bucket in buckets {
        if best.map_or(true, |b| bucket.count > b.count) {
            best = Some(bucket);
        }
    }
    best.map(|b| b.label.clone())
        .unwrap_or_else(|| "-".to_string())
}

/// Spending advice derived from bucket shape
pub fn suggestions_for(buckets: &[ClusterBucket]) -> Vec<String> {
    let mut suggestions = Vec::new();

    let high = buckets.iter().find(|b| b.label == AmountBand::High.label());
    if high.is_some_and(|b| b.percent > 30) {
        suggestions.push(
            "Large purchases make up a big share of spending; consider a budget control policy"
                .to_string(),
        );
    }

    let low = buckets.iter().find(|b| b.label == AmountBand::Low.label());
    if low.is_some_and(|b| b.count > 20) {
        suggestions.push(
            "Many small purchases; consolidating orders could reduce their frequency".to_string(),
        );
    }

    suggestions.push("Review spending data regularly to refine the spending mix".to_string());
    suggestions.push("Bring frequent spending categories under a monthly budget".to_string());
    suggestions
}
