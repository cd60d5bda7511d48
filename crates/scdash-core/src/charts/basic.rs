//! Bar, line and box charts used by the dashboard views

use super::{palette_color, BarMode, ChartKind, ChartSpec, Series, SeriesData};

/// One bar series of a grouped bar chart
#[derive(Debug, Clone)]
pub struct BarGroup {
    pub name: String,
    /// Aligned with the chart categories
    pub values: Vec<Option<f64>>,
    pub color: String,
}

/// Single-series bar chart
pub fn bar_chart(
    title: impl Into<String>,
    categories: Vec<String>,
    values: Vec<Option<f64>>,
    color: &str,
) -> ChartSpec {
    let title = title.into();
    let mut chart = ChartSpec::new(ChartKind::Bar, title.clone());
    chart.layout.show_legend = false;
    chart.push_series(Series::xy(title, categories, values).color(color));
    chart
}

/// Bars side by side per category, one series per group
pub fn grouped_bar_chart(
    title: impl Into<String>,
    categories: &[String],
    groups: Vec<BarGroup>,
) -> ChartSpec {
    let mut chart = ChartSpec::new(ChartKind::Bar, title);
    chart.layout.bar_mode = Some(BarMode::Group);
    for group in groups {
        chart.push_series(Series::xy(group.name, categories.to_vec(), group.values).color(group.color));
    }
    chart
}

/// One point of a per-group line chart
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub group: String,
    pub x: String,
    pub y: f64,
}

/// Line chart with one series per group, colored by group order
///
/// Groups appear in the order they first occur in `observations`; points
/// keep their input order.
pub fn type_line_chart(title: impl Into<String>, observations: &[Observation]) -> ChartSpec {
    let mut chart = ChartSpec::new(ChartKind::Line, title);

    for (idx, group) in group_order(observations.iter().map(|o| o.group.as_str()))
        .into_iter()
        .enumerate()
    {
        let (x, y): (Vec<String>, Vec<Option<f64>>) = observations
            .iter()
            .filter(|o| o.group == group)
            .map(|o| (o.x.clone(), Some(o.y)))
            .unzip();
        chart.push_series(Series::xy(group, x, y).color(palette_color(idx)));
    }
    chart
}

/// Distribution of `samples` per type, one box per type
pub fn box_plot_by_type(title: impl Into<String>, samples: &[(String, f64)]) -> ChartSpec {
    let mut chart = ChartSpec::new(ChartKind::Box, title);

    for (idx, group) in group_order(samples.iter().map(|(t, _)| t.as_str()))
        .into_iter()
        .enumerate()
    {
        let y: Vec<f64> = samples
            .iter()
            .filter(|(t, _)| *t == group)
            .map(|(_, v)| *v)
            .collect();
        let x = vec![group.clone(); y.len()];
        chart.push_series(
            Series::new(group, SeriesData::Samples { x, y }).color(palette_color(idx)),
        );
    }
    chart
}

/// Distinct labels in first-appearance order
pub(crate) fn group_order<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    for label in labels {
        if !order.iter().any(|seen| seen == label) {
            order.push(label.to_string());
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(group: &str, x: &str, y: f64) -> Observation {
        Observation {
            group: group.to_string(),
            x: x.to_string(),
            y,
        }
    }

    #[test]
    fn test_type_line_chart_groups_in_first_appearance_order() {
        let chart = type_line_chart(
            "Clicks Over Time",
            &[obs("docs", "d1", 1.0), obs("blog", "d1", 2.0), obs("docs", "d2", 3.0)],
        );
        let names: Vec<_> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["docs", "blog"]);
        assert_eq!(chart.series[0].color.as_deref(), Some(palette_color(0)));
        assert_eq!(
            chart.series[0].data,
            SeriesData::Xy {
                x: vec!["d1".into(), "d2".into()],
                y: vec![Some(1.0), Some(3.0)]
            }
        );
    }

    #[test]
    fn test_grouped_bar_chart() {
        let categories = vec!["a".to_string(), "b".to_string()];
        let chart = grouped_bar_chart(
            "Performance",
            &categories,
            vec![BarGroup {
                name: "clicks".into(),
                values: vec![Some(1.0), Some(2.0)],
                color: palette_color(0).into(),
            }],
        );
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.layout.bar_mode, Some(BarMode::Group));
        assert_eq!(chart.series.len(), 1);
    }

    #[test]
    fn test_box_plot_one_box_per_type() {
        let samples = vec![
            ("a".to_string(), 0.1),
            ("b".to_string(), 0.2),
            ("a".to_string(), 0.3),
        ];
        let chart = box_plot_by_type("CTR", &samples);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].data.len(), 2);
    }
}
