//! View controllers
//!
//! Each view is a pure function of the table and its parameters that
//! returns a serializable payload: summary cards, chart specs and tables.
//! Views are recomputed in full on every call and never fail on an empty
//! slice; they set `empty` and carry [`NO_DATA`] instead.

mod comparison;
mod detailed;
mod explore;
mod overview;
mod time_analysis;

pub use comparison::{comparison, ComparisonParams, ComparisonRow, ComparisonView};
pub use detailed::{detailed_metrics, DetailedParams, DetailedView, TypePageMetrics};
pub use explore::{explore, ExploreParams, ExploreView};
pub use overview::{overview, OverviewParams, OverviewView};
pub use time_analysis::{time_analysis, TimeAnalysisParams, TimeAnalysisView};

use serde::Serialize;

use crate::models::{DateRange, MetricsTable, Slice};

/// Message shown by views whose slice has no rows
pub const NO_DATA: &str = "No data for the selected date range";

/// Headline number with its display color
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCard {
    pub label: String,
    pub value: String,
    pub color: String,
}

impl SummaryCard {
    pub fn new(label: impl Into<String>, value: impl Into<String>, color: &str) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            color: color.to_string(),
        }
    }
}

/// One table cell; `Missing` serializes as `null`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Cell::Missing, Cell::Number)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Missing => f.write_str("N/A"),
        }
    }
}

/// Ordered rows of named columns
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl DataTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `row` in the named column
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)
    }
}

/// `1234567` -> `"1,234,567"`
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Fixed-decimal rendering with `N/A` for undefined values
pub fn format_optional(value: Option<f64>, decimals: usize, suffix: &str) -> String {
    match value {
        Some(v) => format!("{:.*}{}", decimals, v, suffix),
        None => "N/A".to_string(),
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Explicit range, or the table's full span when none was given
pub(crate) fn resolve_range(table: &MetricsTable, range: Option<DateRange>) -> Option<DateRange> {
    range.or_else(|| table.full_range())
}

/// Rows inside `range`; no range means no rows
pub(crate) fn slice_for<'a>(table: &'a MetricsTable, range: Option<&DateRange>) -> Slice<'a> {
    range.map(|r| table.slice(r)).unwrap_or_default()
}

/// `Some(NO_DATA)` for an empty slice
pub(crate) fn no_data_message(empty: bool) -> Option<String> {
    empty.then(|| NO_DATA.to_string())
}
