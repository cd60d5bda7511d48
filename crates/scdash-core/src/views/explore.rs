//! Explore page: the analysis chart catalogue applied to a date range

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::{no_data_message, resolve_range, slice_for};
use crate::analytics::{
    daily_totals, per_type_aggregate, summarize, weekday_name, AggFn, AggSpec, Column, WEEKDAYS,
};
use crate::charts::{
    funnel_chart, heatmap, multi_metric_chart, radar_chart, scatter_matrix, sunburst, ChartSpec,
    Dimension, HeatCell,
};
use crate::models::{DateRange, Metric, MetricsTable};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExploreParams {
    pub range: Option<DateRange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExploreView {
    pub range: Option<DateRange>,
    pub empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub daily: ChartSpec,
    pub ctr_heatmap: ChartSpec,
    pub hierarchy: ChartSpec,
    pub scatter: ChartSpec,
    pub funnel: ChartSpec,
    pub radar: ChartSpec,
}

pub fn explore(table: &MetricsTable, params: &ExploreParams) -> ExploreView {
    let range = resolve_range(table, params.range);
    let slice = slice_for(table, range.as_ref());

    let daily = multi_metric_chart(
        &daily_totals(&slice),
        &[Metric::Clicks, Metric::Impressions],
        "Daily Clicks and Impressions",
    );

    // Monday-first columns
    let cells: Vec<HeatCell> = WEEKDAYS
        .iter()
        .flat_map(|&day| {
            slice
                .iter()
                .filter(move |r| r.date.weekday() == day)
                .map(move |r| HeatCell {
                    x: weekday_name(day).to_string(),
                    y: r.content_type.clone(),
                    value: r.ctr,
                })
        })
        .collect();
    let ctr_heatmap = heatmap(&cells, "weekday", "type", "CTR by Weekday and Type");

    let hierarchy = sunburst(
        &slice,
        &[Dimension::Type, Dimension::Page],
        Metric::Clicks,
        "Clicks by Type and Page",
    );
    let scatter = scatter_matrix(&slice, &Metric::ALL, "Metric Relationships");

    let summary = summarize(&slice);
    let funnel = funnel_chart(
        &["Impressions".to_string(), "Clicks".to_string()],
        &[summary.total_impressions as f64, summary.total_clicks as f64],
        "Impressions to Clicks",
    );

    let clicks = per_type_aggregate(&slice, &AggSpec::new().with(Column::Clicks, AggFn::Sum));
    let radar_values: Vec<f64> = clicks.column("clicks_sum").into_iter().flatten().collect();
    let radar = radar_chart(&clicks.types(), &radar_values, "Clicks by Type");

    let empty = slice.is_empty();
    ExploreView {
        range,
        empty,
        message: no_data_message(empty),
        daily,
        ctr_heatmap,
        hierarchy,
        scatter,
        funnel,
        radar,
    }
}
