//! Analysis charts: dual-axis lines, heatmap, sunburst, scatter matrix,
//! funnel and radar

use chrono::Datelike;
use std::collections::HashMap;

use super::basic::group_order;
use super::{palette_color, Axis, ChartKind, ChartSpec, Series, SeriesData, PALETTE};
use crate::analytics::{mean, weekday_name, DailyTotals};
use crate::models::{Metric, MetricRecord, Slice};

/// Daily totals of several metrics on one chart
///
/// The second metric is drawn against a secondary y axis so that clicks and
/// impressions stay readable side by side.
pub fn multi_metric_chart(
    days: &[DailyTotals],
    metrics: &[Metric],
    title: impl Into<String>,
) -> ChartSpec {
    let mut chart = ChartSpec::new(ChartKind::Line, title);
    chart.x_axis = Axis::titled("Date");
    chart.layout.hover_mode = Some("x unified".to_string());

    let dates: Vec<String> = days.iter().map(|d| d.date.to_string()).collect();
    for (idx, metric) in metrics.iter().enumerate() {
        let values = days.iter().map(|d| d.value(*metric)).collect();
        let series = Series::xy(metric.label(), dates.clone(), values).color(palette_color(idx));
        if idx == 1 {
            chart.secondary_y_axis = Some(Axis::titled(metric.label()));
            chart.push_series(series.on_secondary_axis());
        } else {
            if idx == 0 {
                chart.y_axis = Axis::titled(metric.label());
            }
            chart.push_series(series);
        }
    }
    chart
}

/// One (x, y, value) triple fed to [`heatmap`]
#[derive(Debug, Clone, PartialEq)]
pub struct HeatCell {
    pub x: String,
    pub y: String,
    pub value: f64,
}

/// Pivot triples into a grid, averaging cells that collide
///
/// Axis labels keep the order they first appear in `cells`.
pub fn heatmap(
    cells: &[HeatCell],
    x_title: &str,
    y_title: &str,
    title: impl Into<String>,
) -> ChartSpec {
    let xs = group_order(cells.iter().map(|c| c.x.as_str()));
    let ys = group_order(cells.iter().map(|c| c.y.as_str()));

    let mut sums: HashMap<(&str, &str), Vec<f64>> = HashMap::new();
    for cell in cells {
        sums.entry((cell.x.as_str(), cell.y.as_str()))
            .or_default()
            .push(cell.value);
    }

    let z: Vec<Vec<Option<f64>>> = ys
        .iter()
        .map(|y| {
            xs.iter()
                .map(|x| {
                    sums.get(&(x.as_str(), y.as_str()))
                        .and_then(|values| mean(values.iter().copied()))
                })
                .collect()
        })
        .collect();

    let mut chart = ChartSpec::new(ChartKind::Heatmap, title).with_axes(x_title, y_title);
    chart.layout.colorscale = PALETTE.iter().map(|c| c.to_string()).collect();
    chart.push_series(Series::new(
        title_case(y_title),
        SeriesData::Grid { x: xs, y: ys, z },
    ));
    chart
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Category level of a sunburst path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Type,
    Page,
    /// `YYYY-MM`
    Month,
    Weekday,
}

impl Dimension {
    fn label(&self, record: &MetricRecord) -> String {
        match self {
            Dimension::Type => record.content_type.clone(),
            Dimension::Page => record.page.clone(),
            Dimension::Month => record.date.format("%Y-%m").to_string(),
            Dimension::Weekday => weekday_name(record.date.weekday()).to_string(),
        }
    }
}

/// Hierarchy of `path` levels sized by the summed `metric`
///
/// Node ids join the labels of their path with `/`, with `\\` and `/` inside
/// a label escaped so that distinct paths never share an id. Every
/// descendant takes the color of its root.
pub fn sunburst(
    slice: &Slice<'_>,
    path: &[Dimension],
    metric: Metric,
    title: impl Into<String>,
) -> ChartSpec {
    let mut ids: Vec<String> = Vec::new();
    let mut labels = Vec::new();
    let mut parents = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    let mut colors = Vec::new();
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut roots = 0usize;

    for record in slice.iter() {
        let value = record.value(metric);
        let mut key: Vec<String> = Vec::with_capacity(path.len());
        let mut parent = String::new();
        let mut color = String::new();

        for (depth, dimension) in path.iter().enumerate() {
            let label = dimension.label(record);
            let id = if depth == 0 {
                escape_id_part(&label)
            } else {
                format!("{}/{}", parent, escape_id_part(&label))
            };
            key.push(label.clone());

            let node = match index.get(&key) {
                Some(&node) => node,
                None => {
                    if depth == 0 {
                        color = palette_color(roots).to_string();
                        roots += 1;
                    }
                    ids.push(id.clone());
                    labels.push(label);
                    parents.push(parent.clone());
                    values.push(0.0);
                    colors.push(color.clone());
                    index.insert(key.clone(), ids.len() - 1);
                    ids.len() - 1
                }
            };
            values[node] += value;
            if depth == 0 {
                color = colors[node].clone();
            }
            parent = id;
        }
    }

    let mut chart = ChartSpec::new(ChartKind::Sunburst, title);
    chart.push_series(Series::new(
        metric.label(),
        SeriesData::Hierarchy {
            ids,
            labels,
            parents,
            values,
            colors,
        },
    ));
    chart
}

fn escape_id_part(label: &str) -> String {
    label.replace('\\', "\\\\").replace('/', "\\/")
}

/// Pairwise scatter of `dimensions`, one series per type
pub fn scatter_matrix(
    slice: &Slice<'_>,
    dimensions: &[Metric],
    title: impl Into<String>,
) -> ChartSpec {
    let mut chart = ChartSpec::new(ChartKind::ScatterMatrix, title);
    chart.layout.drag_mode = Some("select".to_string());
    chart.layout.hover_mode = Some("closest".to_string());

    let names: Vec<String> = dimensions.iter().map(|m| m.label().to_string()).collect();
    for (idx, content_type) in slice.types().into_iter().enumerate() {
        let rows: Vec<Vec<f64>> = slice
            .iter()
            .filter(|r| r.content_type == content_type)
            .map(|r| dimensions.iter().map(|m| r.value(*m)).collect())
            .collect();
        chart.push_series(
            Series::new(
                content_type,
                SeriesData::Matrix {
                    dimensions: names.clone(),
                    rows,
                },
            )
            .color(palette_color(idx)),
        );
    }
    chart
}

/// Ordered funnel, one series per step
///
/// Each step reports its share of the first step; a zero first step leaves
/// the shares undefined.
pub fn funnel_chart(steps: &[String], values: &[f64], title: impl Into<String>) -> ChartSpec {
    let mut chart = ChartSpec::new(ChartKind::Funnel, title);
    chart.layout.show_legend = false;

    let initial = values.first().copied().filter(|v| *v != 0.0);
    for (idx, (step, value)) in steps.iter().zip(values).enumerate() {
        chart.push_series(
            Series::new(
                step.clone(),
                SeriesData::Stages {
                    stages: vec![step.clone()],
                    values: vec![*value],
                    percent_of_initial: vec![initial.map(|first| value / first * 100.0)],
                },
            )
            .color(palette_color(idx)),
        );
    }
    chart
}

/// Filled polygon over named categories, radial axis from zero to the max
pub fn radar_chart(categories: &[String], values: &[f64], title: impl Into<String>) -> ChartSpec {
    let mut chart = ChartSpec::new(ChartKind::Radar, title);
    chart.layout.show_legend = false;
    chart.y_axis.range = values
        .iter()
        .copied()
        .reduce(f64::max)
        .map(|max| [0.0, max]);

    let len = categories.len().min(values.len());
    chart.push_series(
        Series::new(
            "values",
            SeriesData::Polar {
                theta: categories[..len].to_vec(),
                r: values[..len].to_vec(),
                fill: true,
            },
        )
        .color(palette_color(0)),
    );
    chart
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::daily_totals;
    use crate::charts::AxisSide;
    use crate::models::MetricsTable;
    use chrono::NaiveDate;

    fn record(day: u32, content_type: &str, page: &str, clicks: u64) -> MetricRecord {
        MetricRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            content_type: content_type.to_string(),
            page: page.to_string(),
            clicks,
            impressions: clicks * 10,
            ctr: 0.1,
            position: 2.0,
        }
    }

    fn table() -> MetricsTable {
        MetricsTable::from_records(vec![
            record(1, "blog", "/b1", 5),
            record(1, "docs", "/d1", 7),
            record(2, "blog", "/b2", 3),
            record(2, "blog", "/b1", 1),
        ])
    }

    #[test]
    fn test_multi_metric_second_metric_on_secondary_axis() {
        let table = table();
        let days = daily_totals(&table.all());
        let chart = multi_metric_chart(&days, &[Metric::Clicks, Metric::Impressions], "Daily");

        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].axis, AxisSide::Primary);
        assert_eq!(chart.series[1].axis, AxisSide::Secondary);
        assert_eq!(chart.x_axis.title.as_deref(), Some("Date"));
        assert_eq!(chart.layout.hover_mode.as_deref(), Some("x unified"));
        assert_eq!(
            chart.series[0].data,
            SeriesData::Xy {
                x: vec!["2024-01-01".into(), "2024-01-02".into()],
                y: vec![Some(12.0), Some(4.0)]
            }
        );
    }

    #[test]
    fn test_heatmap_means_collisions_and_leaves_gaps() {
        let cell = |x: &str, y: &str, value: f64| HeatCell {
            x: x.to_string(),
            y: y.to_string(),
            value,
        };
        let chart = heatmap(
            &[cell("Mon", "a", 1.0), cell("Mon", "a", 3.0), cell("Tue", "b", 5.0)],
            "weekday",
            "type",
            "CTR",
        );

        match &chart.series[0].data {
            SeriesData::Grid { x, y, z } => {
                assert_eq!(x, &vec!["Mon".to_string(), "Tue".to_string()]);
                assert_eq!(y, &vec!["a".to_string(), "b".to_string()]);
                assert_eq!(z, &vec![vec![Some(2.0), None], vec![None, Some(5.0)]]);
            }
            other => panic!("unexpected data {:?}", other),
        }
        assert_eq!(chart.layout.colorscale.len(), 10);
    }

    #[test]
    fn test_sunburst_sums_up_the_tree() {
        let table = table();
        let chart = sunburst(&table.all(), &[Dimension::Type, Dimension::Page], Metric::Clicks, "Tree");

        match &chart.series[0].data {
            SeriesData::Hierarchy {
                ids,
                parents,
                values,
                colors,
                ..
            } => {
                assert_eq!(ids, &vec!["blog", "blog/\\/b1", "docs", "docs/\\/d1", "blog/\\/b2"]);
                assert_eq!(parents[1], "blog");
                assert_eq!(values, &vec![9.0, 6.0, 7.0, 7.0, 3.0]);
                assert_eq!(colors[0], palette_color(0));
                assert_eq!(colors[1], palette_color(0));
                assert_eq!(colors[2], palette_color(1));
            }
            other => panic!("unexpected data {:?}", other),
        }
    }

    #[test]
    fn test_sunburst_labels_with_slashes_stay_distinct() {
        let table = MetricsTable::from_records(vec![
            record(1, "a", "b/c", 1),
            record(1, "a/b", "c", 2),
        ]);
        let chart = sunburst(&table.all(), &[Dimension::Type, Dimension::Page], Metric::Clicks, "Tree");

        match &chart.series[0].data {
            SeriesData::Hierarchy {
                ids,
                labels,
                parents,
                values,
                ..
            } => {
                assert_eq!(ids.len(), 4);
                let unique: std::collections::HashSet<&String> = ids.iter().collect();
                assert_eq!(unique.len(), 4);
                assert_eq!(labels, &vec!["a", "b/c", "a/b", "c"]);
                assert_eq!(parents[1], ids[0]);
                assert_eq!(parents[3], ids[2]);
                assert_eq!(values, &vec![1.0, 1.0, 2.0, 2.0]);
            }
            other => panic!("unexpected data {:?}", other),
        }
    }

    #[test]
    fn test_scatter_matrix_one_series_per_type() {
        let table = table();
        let chart = scatter_matrix(&table.all(), &[Metric::Clicks, Metric::Ctr], "Matrix");
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "blog");
        assert_eq!(chart.series[0].data.len(), 3);
        assert_eq!(chart.layout.drag_mode.as_deref(), Some("select"));
    }

    #[test]
    fn test_funnel_percent_of_initial() {
        let steps = vec!["Impressions".to_string(), "Clicks".to_string()];
        let chart = funnel_chart(&steps, &[200.0, 50.0], "Funnel");
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[1].color.as_deref(), Some(palette_color(1)));
        match &chart.series[1].data {
            SeriesData::Stages {
                percent_of_initial, ..
            } => assert_eq!(percent_of_initial, &vec![Some(25.0)]),
            other => panic!("unexpected data {:?}", other),
        }

        let zero = funnel_chart(&steps, &[0.0, 0.0], "Funnel");
        assert!(matches!(
            &zero.series[0].data,
            SeriesData::Stages { percent_of_initial, .. } if percent_of_initial == &vec![None]
        ));
    }

    #[test]
    fn test_radar_range_is_zero_to_max() {
        let categories = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let chart = radar_chart(&categories, &[3.0, 9.0, 4.0], "Radar");
        assert_eq!(chart.y_axis.range, Some([0.0, 9.0]));
        assert!(!chart.layout.show_legend);

        let empty = radar_chart(&[], &[], "Radar");
        assert_eq!(empty.y_axis.range, None);
        assert!(empty.is_empty());
    }
}
