//! Detailed metrics page
//!
//! Per-page efficiency by type, a six-panel figure (three bar panels and
//! three per-type time panels) and two summary tables.

use serde::{Deserialize, Serialize};

use super::{no_data_message, resolve_range, round2, slice_for, Cell, DataTable};
use crate::analytics::{
    daily_type_metrics, describe_by_type, per_type_aggregate, AggFn, AggSpec, Column,
    DailyTypeMetrics,
};
use crate::charts::{bar_chart, type_line_chart, ChartSpec, Observation, StackedFigure};
use crate::models::{DateRange, MetricsTable};

const FIGURE_TITLE: &str = "Search Console Performance Metrics Analysis";
const FIGURE_HEIGHT: u32 = 1800;
const BAR_COLORS: [&str; 3] = ["rgb(158,202,225)", "rgb(94,158,217)", "rgb(32,102,148)"];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DetailedParams {
    pub range: Option<DateRange>,
}

/// Per-type efficiency figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypePageMetrics {
    #[serde(rename = "type")]
    pub content_type: String,
    pub clicks_per_page: Option<f64>,
    pub impressions_per_page: Option<f64>,
    /// Mean of the row-level CTR
    pub ctr_per_page: Option<f64>,
    pub pages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailedView {
    pub range: Option<DateRange>,
    pub empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub per_type: Vec<TypePageMetrics>,
    pub figure: StackedFigure,
    pub per_page_table: DataTable,
    pub time_table: DataTable,
}

pub fn detailed_metrics(table: &MetricsTable, params: &DetailedParams) -> DetailedView {
    let range = resolve_range(table, params.range);
    let slice = slice_for(table, range.as_ref());

    let agg = per_type_aggregate(
        &slice,
        &AggSpec::new()
            .with(Column::Clicks, AggFn::Sum)
            .with(Column::Impressions, AggFn::Sum)
            .with(Column::Ctr, AggFn::Mean)
            .with(Column::Page, AggFn::Nunique),
    );
    let per_type: Vec<TypePageMetrics> = agg
        .types()
        .into_iter()
        .map(|content_type| {
            let pages = agg.get(&content_type, "page_nunique").unwrap_or(0.0);
            let per_page = |column: &str| {
                agg.get(&content_type, column)
                    .filter(|_| pages > 0.0)
                    .map(|total| total / pages)
            };
            TypePageMetrics {
                clicks_per_page: per_page("clicks_sum"),
                impressions_per_page: per_page("impressions_sum"),
                ctr_per_page: agg.get(&content_type, "ctr_mean"),
                pages: pages as usize,
                content_type,
            }
        })
        .collect();

    let daily = daily_type_metrics(&slice);
    let types = slice.types();

    let categories: Vec<String> = per_type.iter().map(|m| m.content_type.clone()).collect();
    let bar = |title: &str, y_title: &str, values: Vec<Option<f64>>, color: &str| -> ChartSpec {
        let mut chart = bar_chart(y_title, categories.clone(), values, color).with_axes("type", y_title);
        chart.title = title.to_string();
        chart
    };

    let panels = vec![
        bar(
            "Average Clicks per Page by Type",
            "Clicks per Page",
            per_type.iter().map(|m| m.clicks_per_page).collect(),
            BAR_COLORS[0],
        ),
        bar(
            "Average Impressions per Page by Type",
            "Impressions per Page",
            per_type.iter().map(|m| m.impressions_per_page).collect(),
            BAR_COLORS[1],
        ),
        bar(
            "Average CTR by Type",
            "CTR",
            per_type.iter().map(|m| m.ctr_per_page).collect(),
            BAR_COLORS[2],
        ),
        time_panel("Clicks Over Time by Type", "Clicks", &types, &daily, |d| d.clicks as f64),
        time_panel("Impressions Over Time by Type", "Impressions", &types, &daily, |d| {
            d.impressions as f64
        }),
        time_panel("CTR Over Time by Type", "CTR", &types, &daily, |d| d.ctr),
    ];

    let mut per_page_table = DataTable::new([
        "type",
        "clicks_per_page",
        "impressions_per_page",
        "ctr_per_page",
        "page",
    ]);
    for m in &per_type {
        per_page_table.push_row(vec![
            m.content_type.as_str().into(),
            m.clicks_per_page.map(round2).into(),
            m.impressions_per_page.map(round2).into(),
            m.ctr_per_page.map(round2).into(),
            (m.pages as f64).into(),
        ]);
    }

    let mut time_table = DataTable::new([
        "type",
        "clicks_mean",
        "clicks_min",
        "clicks_max",
        "impressions_mean",
        "impressions_min",
        "impressions_max",
        "ctr_mean",
        "ctr_min",
        "ctr_max",
    ]);
    for stats in describe_by_type(&daily) {
        let mut row: Vec<Cell> = vec![stats.content_type.clone().into()];
        for s in [stats.clicks, stats.impressions, stats.ctr] {
            row.extend([round2(s.mean).into(), round2(s.min).into(), round2(s.max).into()]);
        }
        time_table.push_row(row);
    }

    let empty = slice.is_empty();
    DetailedView {
        range,
        empty,
        message: no_data_message(empty),
        per_type,
        figure: StackedFigure {
            title: FIGURE_TITLE.to_string(),
            height: FIGURE_HEIGHT,
            panels,
        },
        per_page_table,
        time_table,
    }
}

/// One line per type, named `"<type> <metric>"`
fn time_panel(
    title: &str,
    metric_label: &str,
    types: &[String],
    daily: &[DailyTypeMetrics],
    value: impl Fn(&DailyTypeMetrics) -> f64,
) -> ChartSpec {
    let mut observations = Vec::new();
    for content_type in types {
        for d in daily.iter().filter(|d| &d.content_type == content_type) {
            observations.push(Observation {
                group: format!("{} {}", content_type, metric_label),
                x: d.date.to_string(),
                y: value(d),
            });
        }
    }
    type_line_chart(title, &observations).with_axes("Date", metric_label)
}
