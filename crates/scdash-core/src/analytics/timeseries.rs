//! Time-bucketed series
//!
//! Groups rows by (bucket label, content type). Output is ordered by
//! bucket, then type, so a chart can take each type's points as-is.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::summary::{mean, ratio_percent};
use crate::models::{Bucket, Metric, Slice};

/// One (bucket, type) cell of a time series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub bucket: NaiveDate,
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: f64,
}

/// Metric summed per (bucket, type)
///
/// Holds the computed points; iterating never consumes them, so the
/// series can be walked any number of times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub metric: Metric,
    pub bucket: Bucket,
    points: Vec<TimeSeriesPoint>,
}

impl TimeSeries {
    pub fn iter(&self) -> impl Iterator<Item = &TimeSeriesPoint> + '_ {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points of one type, in bucket order
    pub fn for_type<'s>(
        &'s self,
        content_type: &'s str,
    ) -> impl Iterator<Item = &'s TimeSeriesPoint> + 's {
        self.points
            .iter()
            .filter(move |p| p.content_type == content_type)
    }

    /// Sum of every point
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }
}

impl<'s> IntoIterator for &'s TimeSeries {
    type Item = &'s TimeSeriesPoint;
    type IntoIter = std::slice::Iter<'s, TimeSeriesPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Sum `metric` per (bucket(date), type)
pub fn time_series(slice: &Slice<'_>, metric: Metric, bucket: Bucket) -> TimeSeries {
    let mut groups: BTreeMap<(NaiveDate, &str), f64> = BTreeMap::new();

    for record in slice.iter() {
        *groups
            .entry((bucket.label(record.date), record.content_type.as_str()))
            .or_default() += record.value(metric);
    }

    let points = groups
        .into_iter()
        .map(|((bucket, content_type), value)| TimeSeriesPoint {
            bucket,
            content_type: content_type.to_string(),
            value,
        })
        .collect();

    TimeSeries {
        metric,
        bucket,
        points,
    }
}

/// Daily per-type aggregate used by the detailed view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTypeMetrics {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub content_type: String,
    pub clicks: u64,
    pub impressions: u64,
    /// Mean of the row-level `ctr` column
    pub ctr: f64,
}

#[derive(Default)]
struct DailyAccumulator {
    clicks: u64,
    impressions: u64,
    ctr_sum: f64,
    rows: usize,
}

/// Clicks and impressions summed, CTR averaged, per (date, type)
pub fn daily_type_metrics(slice: &Slice<'_>) -> Vec<DailyTypeMetrics> {
    let mut groups: BTreeMap<(NaiveDate, &str), DailyAccumulator> = BTreeMap::new();

    for record in slice.iter() {
        let acc = groups
            .entry((record.date, record.content_type.as_str()))
            .or_default();
        acc.clicks = acc.clicks.saturating_add(record.clicks);
        acc.impressions = acc.impressions.saturating_add(record.impressions);
        acc.ctr_sum += record.ctr;
        acc.rows += 1;
    }

    groups
        .into_iter()
        .map(|((date, content_type), acc)| DailyTypeMetrics {
            date,
            content_type: content_type.to_string(),
            clicks: acc.clicks,
            impressions: acc.impressions,
            ctr: acc.ctr_sum / acc.rows as f64,
        })
        .collect()
}

/// Totals per date across all types
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub clicks: u64,
    pub impressions: u64,
    /// Aggregate CTR in percent
    pub ctr: Option<f64>,
    pub position: Option<f64>,
}

impl DailyTotals {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Clicks => Some(self.clicks as f64),
            Metric::Impressions => Some(self.impressions as f64),
            Metric::Ctr => self.ctr,
            Metric::Position => self.position,
        }
    }
}

/// One row per date with clicks, impressions, CTR and mean position
pub fn daily_totals(slice: &Slice<'_>) -> Vec<DailyTotals> {
    let mut days: BTreeMap<NaiveDate, (u64, u64, Vec<f64>)> = BTreeMap::new();

    for record in slice.iter() {
        let day = days.entry(record.date).or_default();
        day.0 = day.0.saturating_add(record.clicks);
        day.1 = day.1.saturating_add(record.impressions);
        day.2.push(record.position);
    }

    days.into_iter()
        .map(|(date, (clicks, impressions, positions))| DailyTotals {
            date,
            clicks,
            impressions,
            ctr: ratio_percent(clicks, impressions),
            position: mean(positions),
        })
        .collect()
}
