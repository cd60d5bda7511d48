//! Period comparison page

use serde::{Deserialize, Serialize};

use super::{format_optional, no_data_message, DataTable};
use crate::analytics::{percent_change, period_type_means};
use crate::charts::{grouped_bar_chart, palette_color, BarGroup, ChartSpec};
use crate::models::{DateRange, Metric, MetricsTable};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComparisonParams {
    pub period1: DateRange,
    pub period2: DateRange,
    pub metrics: Vec<Metric>,
}

impl ComparisonParams {
    /// First `window_days` of the table against its last `window_days`,
    /// comparing clicks and impressions; `None` for an empty table
    pub fn defaults_for(table: &MetricsTable, window_days: u64) -> Option<Self> {
        let (min, max) = table.date_bounds()?;
        Some(Self {
            period1: DateRange::days_after(min, window_days),
            period2: DateRange::days_before(max, window_days),
            metrics: vec![Metric::Clicks, Metric::Impressions],
        })
    }
}

/// One (type, metric) line of the comparison summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    #[serde(rename = "type")]
    pub content_type: String,
    pub metric: Metric,
    pub period1_avg: Option<f64>,
    pub period2_avg: Option<f64>,
    /// Signed percent change; `None` when period 1 is zero or missing
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonView {
    /// `None` only when there was nothing to compare
    pub period1: Option<DateRange>,
    pub period2: Option<DateRange>,
    pub empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub charts: Vec<ChartSpec>,
    pub rows: Vec<ComparisonRow>,
    pub table: DataTable,
}

impl ComparisonView {
    /// No-data render for a table with no dates to default the periods from
    pub fn no_data() -> Self {
        Self {
            period1: None,
            period2: None,
            empty: true,
            message: no_data_message(true),
            charts: Vec::new(),
            rows: Vec::new(),
            table: summary_table(&[]),
        }
    }
}

pub fn comparison(table: &MetricsTable, params: &ComparisonParams) -> ComparisonView {
    let p1 = table.slice(&params.period1);
    let p2 = table.slice(&params.period2);
    let types = table.types();

    let mut charts = Vec::with_capacity(params.metrics.len());
    let mut rows = Vec::new();

    for &metric in &params.metrics {
        let before = period_type_means(&p1, metric, types);
        let after = period_type_means(&p2, metric, types);

        charts.push(
            grouped_bar_chart(
                format!("{} Comparison by Type", metric.label()),
                types,
                vec![
                    BarGroup {
                        name: format!("Period 1 ({})", params.period1),
                        values: before.iter().map(|(_, v)| *v).collect(),
                        color: palette_color(0).to_string(),
                    },
                    BarGroup {
                        name: format!("Period 2 ({})", params.period2),
                        values: after.iter().map(|(_, v)| *v).collect(),
                        color: palette_color(4).to_string(),
                    },
                ],
            )
            .with_axes("type", metric.label()),
        );

        for ((content_type, p1_avg), (_, p2_avg)) in before.into_iter().zip(after) {
            rows.push(ComparisonRow {
                content_type,
                metric,
                period1_avg: p1_avg,
                period2_avg: p2_avg,
                change_pct: percent_change(p1_avg, p2_avg),
            });
        }
    }

    let empty = p1.is_empty() && p2.is_empty();
    ComparisonView {
        period1: Some(params.period1),
        period2: Some(params.period2),
        empty,
        message: no_data_message(empty),
        charts,
        table: summary_table(&rows),
        rows,
    }
}

fn summary_table(rows: &[ComparisonRow]) -> DataTable {
    let mut summary = DataTable::new(["Type", "Metric", "Period 1 Avg", "Period 2 Avg", "Change %"]);
    for row in rows {
        summary.push_row(vec![
            row.content_type.as_str().into(),
            row.metric.label().into(),
            format_optional(row.period1_avg, 2, "").into(),
            format_optional(row.period2_avg, 2, "").into(),
            format_change(row.change_pct).into(),
        ]);
    }
    summary
}

fn format_change(change: Option<f64>) -> String {
    match change {
        Some(pct) => format!("{:+.2}%", pct),
        None => "N/A".to_string(),
    }
}
