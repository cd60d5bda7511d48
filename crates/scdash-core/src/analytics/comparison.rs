//! Two-period comparison helpers

use super::summary::mean;
use crate::models::{Metric, Slice};

/// Mean of `metric` for each of `types` within the slice
///
/// Types with no rows in the slice get `None`.
pub fn period_type_means(
    slice: &Slice<'_>,
    metric: Metric,
    types: &[String],
) -> Vec<(String, Option<f64>)> {
    types
        .iter()
        .map(|content_type| {
            let avg = mean(
                slice
                    .iter()
                    .filter(|r| &r.content_type == content_type)
                    .map(|r| r.value(metric)),
            );
            (content_type.clone(), avg)
        })
        .collect()
}

/// Signed percent change from `before` to `after`
///
/// `None` when either side is missing or `before` is zero.
pub fn percent_change(before: Option<f64>, after: Option<f64>) -> Option<f64> {
    match (before, after) {
        (Some(before), Some(after)) if before != 0.0 => Some((after - before) / before * 100.0),
        _ => None,
    }
}
