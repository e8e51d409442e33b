//! Monthly spending trend and forecast
//!
//! The local fallback sums records into a fixed window of consecutive months
//! ending at the current month, then extrapolates the last two values one
//! month ahead.

use crate::config::TrendConfig;
use crate::error::{Error, Result};
use crate::models::{ExpenseRecord, MonthKey};
use crate::remote::RemoteTrend;

use super::types::{TrendPoint, TrendSeries};

/// Suffix the remote service appends to forecast labels
const FORECAST_LABEL_SUFFIX: &str = " (预测)";

/// Maps amounts onto bar heights for one series
#[derive(Debug, Clone, Copy)]
pub struct HeightScale {
    max_value: f64,
    base: u32,
    span: u32,
}

impl HeightScale {
    /// Scale against the largest value (never below 1)
    pub fn new<I: IntoIterator<Item = f64>>(values: I, config: &TrendConfig) -> Self {
        let max_value = values.into_iter().fold(1.0_f64, f64::max);
        Self {
            max_value,
            base: config.height_base,
            span: config.height_span,
        }
    }

    /// `round(amount / max * span) + base`, kept inside `[base, base + span]`
    pub fn height(&self, amount: f64) -> u32 {
        let scaled = (amount.max(0.0) / self.max_value * self.span as f64).round();
        (scaled.min(self.span as f64) as u32).saturating_add(self.base)
    }
}

/// Two-point linear extrapolation, floored at zero
///
/// Returns None with fewer than two values.
pub fn linear_forecast(values: &[f64]) -> Option<f64> {
    match values {
        [.., prev, last] => Some((last + (last - prev)).max(0.0)),
        _ => None,
    }
}

/// The window of months ending at `current`, oldest first
pub fn month_window(current: MonthKey, months: usize) -> Vec<MonthKey> {
    (0..months)
        .rev()
        .map(|back| current.offset(-(back as i32)))
        .collect()
}

/// Local trend over the configured window plus a one-month forecast
pub fn local_trend(records: &[ExpenseRecord], current: MonthKey, config: &TrendConfig) -> TrendSeries {
    let window = month_window(current, config.window_months);
    let mut totals = vec![0.0_f64; window.len()];

    for record in records {
        let Some(month) = record.month() else {
            continue;
        };
        // Months outside the window are ignored
        if let Some(slot) = window.iter().position(|m| *m == month) {
            totals[slot] += record.amount;
        }
    }

    let scale = HeightScale::new(totals.iter().copied(), config);
    let mut points: Vec<TrendPoint> = window
        .iter()
        .zip(&totals)
        .map(|(month, amount)| TrendPoint {
            month: *month,
            label: month.label(),
            amount: *amount,
            height: scale.height(*amount),
            is_forecast: false,
        })
        .collect();

    if let (Some(predicted), Some(last)) = (linear_forecast(&totals), window.last()) {
        let month = last.next();
        points.push(TrendPoint {
            month,
            label: month.label(),
            amount: predicted,
            height: scale.height(predicted),
            is_forecast: true,
        });
    }

    TrendSeries { points }
}

impl TrendSeries {
    /// Transform a remote trend payload into the display model
    ///
    /// Requires a non-empty month list with one amount per month. The
    /// forecast point is added only when both forecast and label are present.
    pub fn from_remote(remote: &RemoteTrend, config: &TrendConfig) -> Result<Self> {
        if remote.months.is_empty() {
            return Err(Error::MalformedRemoteResult("trend payload has no months".into()));
        }
        if remote.months.len() != remote.amounts.len() {
            return Err(Error::MalformedRemoteResult(format!(
                "trend payload has {} months but {} amounts",
                remote.months.len(),
                remote.amounts.len()
            )));
        }

        let months = remote
            .months
            .iter()
            .map(|m| parse_month_prefix(m))
            .collect::<Result<Vec<_>>>()?;

        // Shown and scaled as the same rounded, non-negative value
        let forecast_amount = remote.forecast.map(|f| f.round().max(0.0));
        let forecast = match (forecast_amount, remote.forecast_label.as_deref()) {
            (Some(amount), Some(label)) => {
                let label = label.trim().trim_end_matches(FORECAST_LABEL_SUFFIX);
                Some((parse_month_prefix(label)?, amount))
            }
            _ => None,
        };

        let scale = HeightScale::new(
            remote.amounts.iter().copied().chain(forecast_amount),
            config,
        );

        let mut points: Vec<TrendPoint> = months
            .iter()
            .zip(&remote.amounts)
            .map(|(month, amount)| TrendPoint {
                month: *month,
                label: month.label(),
                amount: *amount,
                height: scale.height(*amount),
                is_forecast: false,
            })
            .collect();

        if let Some((month, amount)) = forecast {
            points.push(TrendPoint {
                month,
                label: month.label(),
                amount,
                height: scale.height(amount),
                is_forecast: true,
            });
        }

        Ok(Self { points })
    }
}

fn parse_month_prefix(s: &str) -> Result<MonthKey> {
    s.trim()
        .get(..7)
        .unwrap_or(s)
        .parse()
        .map_err(Error::MalformedRemoteResult)
}
