//! Time analysis page
//!
//! Runs over the whole table: the metric per type over time (optionally
//! with a dashed moving-average overlay per type), the weekday profile and
//! the monthly per-type means.

use serde::{Deserialize, Serialize};

use super::{no_data_message, resolve_range};
use crate::analytics::{
    monthly_average, moving_average, smoothing::DEFAULT_WINDOW, time_series, weekday_average,
    MonthlyPoint, TimeSeries, WeekdayAverage,
};
use crate::charts::{bar_chart, palette_color, type_line_chart, ChartSpec, Observation, Series};
use crate::models::{Bucket, DateRange, Metric, MetricsTable};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimeAnalysisParams {
    pub metric: Metric,
    pub bucket: Bucket,
    pub moving_average: bool,
    /// Moving-average window in buckets
    pub window: usize,
}

impl Default for TimeAnalysisParams {
    fn default() -> Self {
        Self {
            metric: Metric::Clicks,
            bucket: Bucket::Day,
            moving_average: false,
            window: DEFAULT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeAnalysisView {
    pub metric: Metric,
    pub bucket: Bucket,
    pub range: Option<DateRange>,
    pub empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub series: TimeSeries,
    pub time_chart: ChartSpec,
    pub weekday: Vec<WeekdayAverage>,
    pub weekday_chart: ChartSpec,
    pub monthly: Vec<MonthlyPoint>,
    pub monthly_chart: ChartSpec,
}

pub fn time_analysis(table: &MetricsTable, params: &TimeAnalysisParams) -> TimeAnalysisView {
    let slice = table.all();
    let metric = params.metric;
    let label = metric.label();
    let types = table.types();

    let series = time_series(&slice, metric, params.bucket);
    let observations: Vec<Observation> = types
        .iter()
        .flat_map(|t| series.for_type(t))
        .map(|p| Observation {
            group: p.content_type.clone(),
            x: p.bucket.to_string(),
            y: p.value,
        })
        .collect();
    let mut time_chart =
        type_line_chart(format!("{} Over Time", label), &observations).with_axes("Date", label);

    if params.moving_average {
        for (idx, content_type) in types.iter().enumerate() {
            let (x, values): (Vec<String>, Vec<f64>) = series
                .for_type(content_type)
                .map(|p| (p.bucket.to_string(), p.value))
                .unzip();
            let name = format!("{} ({}-day MA)", content_type, params.window);
            time_chart.push_series(
                Series::xy(name, x, moving_average(&values, params.window))
                    .color(palette_color(idx))
                    .dashed(),
            );
        }
    }

    let weekday = weekday_average(&slice, metric);
    let weekday_chart = bar_chart(
        format!("Average {} by Day of Week", label),
        weekday.iter().map(|w| w.day.to_string()).collect(),
        weekday.iter().map(|w| w.value).collect(),
        palette_color(0),
    )
    .with_axes("weekday", label);

    let monthly = monthly_average(&slice, metric);
    let monthly_observations: Vec<Observation> = types
        .iter()
        .flat_map(|t| monthly.iter().filter(move |m| &m.content_type == t))
        .map(|m| Observation {
            group: m.content_type.clone(),
            x: m.month.clone(),
            y: m.value,
        })
        .collect();
    let monthly_chart = type_line_chart(format!("Monthly {} Trends", label), &monthly_observations)
        .with_axes("month", label);

    let empty = slice.is_empty();
    TimeAnalysisView {
        metric,
        bucket: params.bucket,
        range: resolve_range(table, None),
        empty,
        message: no_data_message(empty),
        series,
        time_chart,
        weekday,
        weekday_chart,
        monthly,
        monthly_chart,
    }
}
