//! The in-memory metrics table and date-filtered slices of it
//!
//! The table is built once and never mutated. Every view borrows it and
//! works on a [`Slice`], a list of references to the matching rows.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::record::{parse_iso_date, MetricRecord};
use crate::error::CoreError;

/// Inclusive calendar date range
///
/// `start > end` is allowed and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse both bounds from ISO-8601 strings
    pub fn parse(start: &str, end: &str) -> Result<Self, CoreError> {
        Ok(Self::new(parse_bound("start", start)?, parse_bound("end", end)?))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Range from optional user bounds
    ///
    /// With neither bound given this is `fallback`; a missing bound is
    /// taken from `fallback`. `names` label the bounds in errors. `None`
    /// only when a bound is missing and there is no fallback.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        names: (&str, &str),
        fallback: Option<DateRange>,
    ) -> Result<Option<Self>, CoreError> {
        if start.is_none() && end.is_none() {
            return Ok(fallback);
        }

        let start = match start {
            Some(v) => Some(parse_bound(names.0, v)?),
            None => fallback.map(|r| r.start),
        };
        let end = match end {
            Some(v) => Some(parse_bound(names.1, v)?),
            None => fallback.map(|r| r.end),
        };

        Ok(match (start, end) {
            (Some(start), Some(end)) => Some(Self::new(start, end)),
            _ => None,
        })
    }

    /// The `days`-long window starting at `start`
    pub fn days_after(start: NaiveDate, days: u64) -> Self {
        Self::new(start, start.checked_add_days(Days::new(days)).unwrap_or(start))
    }

    /// The `days`-long window ending at `end`
    pub fn days_before(end: NaiveDate, days: u64) -> Self {
        Self::new(end.checked_sub_days(Days::new(days)).unwrap_or(end), end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

fn parse_bound(name: &str, value: &str) -> Result<NaiveDate, CoreError> {
    parse_iso_date(value)
        .ok_or_else(|| CoreError::invalid_parameter(name, value, "expected YYYY-MM-DD"))
}

/// Immutable table of search-console rows
#[derive(Debug, Clone, Default)]
pub struct MetricsTable {
    records: Vec<MetricRecord>,
    /// Distinct content types in first-appearance order
    types: Vec<String>,
}

impl MetricsTable {
    pub fn from_records(records: Vec<MetricRecord>) -> Self {
        let types = distinct_types(records.iter());
        Self { records, types }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    /// Distinct content types in the order they first appear
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Earliest and latest date, `None` for an empty table
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    pub fn full_range(&self) -> Option<DateRange> {
        self.date_bounds()
            .map(|(start, end)| DateRange::new(start, end))
    }

    /// Every row
    pub fn all(&self) -> Slice<'_> {
        Slice {
            rows: self.records.iter().collect(),
        }
    }

    /// Rows whose date falls inside `range`
    pub fn slice(&self, range: &DateRange) -> Slice<'_> {
        Slice {
            rows: self
                .records
                .iter()
                .filter(|r| range.contains(r.date))
                .collect(),
        }
    }
}

/// Borrowed subset of a [`MetricsTable`]
#[derive(Debug, Clone, Default)]
pub struct Slice<'a> {
    rows: Vec<&'a MetricRecord>,
}

impl<'a> Slice<'a> {
    pub fn from_rows(rows: Vec<&'a MetricRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a MetricRecord> + '_ {
        self.rows.iter().copied()
    }

    /// Distinct content types of this slice in first-appearance order
    pub fn types(&self) -> Vec<String> {
        distinct_types(self.iter())
    }
}

fn distinct_types<'a>(records: impl Iterator<Item = &'a MetricRecord>) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .filter(|&r| seen.insert(r.content_type.as_str()))
        .map(|r| r.content_type.clone())
        .collect()
}
