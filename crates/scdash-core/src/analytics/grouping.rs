//! Per-type group-by aggregation

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::summary::mean;
use super::timeseries::DailyTypeMetrics;
use crate::models::{MetricRecord, Slice};

/// Column that can be aggregated per type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Clicks,
    Impressions,
    Ctr,
    Position,
    Page,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Clicks => "clicks",
            Column::Impressions => "impressions",
            Column::Ctr => "ctr",
            Column::Position => "position",
            Column::Page => "page",
        }
    }

    fn numeric(&self, record: &MetricRecord) -> Option<f64> {
        match self {
            Column::Clicks => Some(record.clicks as f64),
            Column::Impressions => Some(record.impressions as f64),
            Column::Ctr => Some(record.ctr),
            Column::Position => Some(record.position),
            Column::Page => None,
        }
    }

    /// Hashable identity of the cell, for distinct counting
    fn distinct_key(&self, record: &MetricRecord) -> String {
        match self {
            Column::Page => record.page.clone(),
            other => other.numeric(record).unwrap_or_default().to_bits().to_string(),
        }
    }
}

/// Aggregation applied to a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggFn {
    Sum,
    Mean,
    Nunique,
    Min,
    Max,
}

impl AggFn {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggFn::Sum => "sum",
            AggFn::Mean => "mean",
            AggFn::Nunique => "nunique",
            AggFn::Min => "min",
            AggFn::Max => "max",
        }
    }
}

impl fmt::Display for AggFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered list of (column, aggregation) pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggSpec {
    entries: Vec<(Column, AggFn)>,
}

impl AggSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: Column, agg: AggFn) -> Self {
        self.entries.push((column, agg));
        self
    }

    /// Output column names, `<column>_<agg>`
    pub fn column_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(column, agg)| format!("{}_{}", column.as_str(), agg))
            .collect()
    }
}

/// One group of an [`AggregateTable`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    #[serde(rename = "type")]
    pub content_type: String,
    /// Aligned with [`AggregateTable::columns`]; numeric aggregations of
    /// the page column are `None`
    pub values: Vec<Option<f64>>,
}

/// Result of a per-type group-by, rows sorted by type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTable {
    pub columns: Vec<String>,
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn types(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.content_type.clone()).collect()
    }

    /// Value for one type and output column
    pub fn get(&self, content_type: &str, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|r| r.content_type == content_type)
            .and_then(|r| r.values.get(idx).copied().flatten())
    }

    /// Whole output column, aligned with `rows`
    pub fn column(&self, column: &str) -> Vec<Option<f64>> {
        match self.columns.iter().position(|c| c == column) {
            Some(idx) => self
                .rows
                .iter()
                .map(|r| r.values.get(idx).copied().flatten())
                .collect(),
            None => vec![None; self.rows.len()],
        }
    }
}

fn apply(column: Column, agg: AggFn, rows: &[&MetricRecord]) -> Option<f64> {
    if agg == AggFn::Nunique {
        let distinct: HashSet<String> = rows.iter().map(|r| column.distinct_key(r)).collect();
        return Some(distinct.len() as f64);
    }

    let values = rows.iter().filter_map(|r| column.numeric(r));
    match agg {
        AggFn::Sum if column != Column::Page => Some(values.sum()),
        AggFn::Mean => mean(values),
        AggFn::Min => values.reduce(f64::min),
        AggFn::Max => values.reduce(f64::max),
        _ => None,
    }
}

/// Group a slice by type and aggregate each requested column
pub fn per_type_aggregate(slice: &Slice<'_>, spec: &AggSpec) -> AggregateTable {
    let mut groups: BTreeMap<&str, Vec<&MetricRecord>> = BTreeMap::new();
    for record in slice.iter() {
        groups
            .entry(record.content_type.as_str())
            .or_default()
            .push(record);
    }

    let rows = groups
        .into_iter()
        .map(|(content_type, records)| AggregateRow {
            content_type: content_type.to_string(),
            values: spec
                .entries
                .iter()
                .map(|&(column, agg)| apply(column, agg, &records))
                .collect(),
        })
        .collect();

    AggregateTable {
        columns: spec.column_names(),
        rows,
    }
}

/// Mean, min and max of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Stats {
    fn of(values: &[f64]) -> Option<Self> {
        Some(Self {
            mean: mean(values.iter().copied())?,
            min: values.iter().copied().reduce(f64::min)?,
            max: values.iter().copied().reduce(f64::max)?,
        })
    }
}

/// Per-type spread of the daily clicks, impressions and CTR
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeStats {
    #[serde(rename = "type")]
    pub content_type: String,
    pub clicks: Stats,
    pub impressions: Stats,
    pub ctr: Stats,
}

/// Describe daily per-type rows, one [`TypeStats`] per type sorted by type
pub fn describe_by_type(daily: &[DailyTypeMetrics]) -> Vec<TypeStats> {
    let mut groups: BTreeMap<&str, (Vec<f64>, Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for row in daily {
        let group = groups.entry(row.content_type.as_str()).or_default();
        group.0.push(row.clicks as f64);
        group.1.push(row.impressions as f64);
        group.2.push(row.ctr);
    }

    groups
        .into_iter()
        .filter_map(|(content_type, (clicks, impressions, ctr))| {
            Some(TypeStats {
                content_type: content_type.to_string(),
                clicks: Stats::of(&clicks)?,
                impressions: Stats::of(&impressions)?,
                ctr: Stats::of(&ctr)?,
            })
        })
        .collect()
}
