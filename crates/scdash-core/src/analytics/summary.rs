//! Headline totals for a slice

use serde::Serialize;
use std::collections::HashSet;

use crate::models::Slice;

/// Scalar summary of a slice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub row_count: usize,
    pub total_clicks: u64,
    pub total_impressions: u64,
    /// `total_clicks / total_impressions * 100`, `None` without impressions
    pub avg_ctr: Option<f64>,
    /// Mean of `position`, `None` on an empty slice
    pub avg_position: Option<f64>,
    pub distinct_pages: usize,
}

impl AggregateSummary {
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

/// Totals, CTR and mean position over a slice
pub fn summarize(slice: &Slice<'_>) -> AggregateSummary {
    let mut total_clicks = 0u64;
    let mut total_impressions = 0u64;
    let mut pages = HashSet::new();

    for record in slice.iter() {
        total_clicks = total_clicks.saturating_add(record.clicks);
        total_impressions = total_impressions.saturating_add(record.impressions);
        pages.insert(record.page.as_str());
    }

    AggregateSummary {
        row_count: slice.len(),
        total_clicks,
        total_impressions,
        avg_ctr: ratio_percent(total_clicks, total_impressions),
        avg_position: mean(slice.iter().map(|r| r.position)),
        distinct_pages: pages.len(),
    }
}

/// `numerator / denominator * 100`, `None` when the denominator is zero
pub fn ratio_percent(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64 * 100.0)
    }
}

/// Arithmetic mean, `None` for no values
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
