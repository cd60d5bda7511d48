//! Overview page: headline cards, performance by type and CTR spread

use serde::{Deserialize, Serialize};

use super::{format_optional, format_thousands, no_data_message, resolve_range, slice_for, SummaryCard};
use crate::analytics::{per_type_aggregate, summarize, AggFn, AggSpec, AggregateSummary, Column};
use crate::charts::{box_plot_by_type, grouped_bar_chart, palette_color, BarGroup, ChartSpec};
use crate::models::{DateRange, MetricsTable};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OverviewParams {
    /// Defaults to the table's full span
    pub range: Option<DateRange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewView {
    pub range: Option<DateRange>,
    pub empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub summary: AggregateSummary,
    pub cards: Vec<SummaryCard>,
    pub type_performance: ChartSpec,
    pub ctr_distribution: ChartSpec,
}

pub fn overview(table: &MetricsTable, params: &OverviewParams) -> OverviewView {
    let range = resolve_range(table, params.range);
    let slice = slice_for(table, range.as_ref());
    let summary = summarize(&slice);

    let cards = vec![
        SummaryCard::new("Total Clicks", format_thousands(summary.total_clicks), palette_color(0)),
        SummaryCard::new(
            "Total Impressions",
            format_thousands(summary.total_impressions),
            palette_color(2),
        ),
        SummaryCard::new("Average CTR", format_optional(summary.avg_ctr, 2, "%"), palette_color(4)),
        SummaryCard::new(
            "Average Position",
            format_optional(summary.avg_position, 2, ""),
            palette_color(6),
        ),
    ];

    let by_type = per_type_aggregate(
        &slice,
        &AggSpec::new()
            .with(Column::Clicks, AggFn::Sum)
            .with(Column::Impressions, AggFn::Sum),
    );
    let type_performance = grouped_bar_chart(
        "Performance by Content Type",
        &by_type.types(),
        vec![
            BarGroup {
                name: "clicks".to_string(),
                values: by_type.column("clicks_sum"),
                color: palette_color(0).to_string(),
            },
            BarGroup {
                name: "impressions".to_string(),
                values: by_type.column("impressions_sum"),
                color: palette_color(4).to_string(),
            },
        ],
    )
    .with_axes("type", "value");

    let samples: Vec<(String, f64)> = slice
        .iter()
        .map(|r| (r.content_type.clone(), r.ctr))
        .collect();
    let ctr_distribution =
        box_plot_by_type("CTR Distribution by Content Type", &samples).with_axes("type", "ctr");

    let empty = slice.is_empty();
    OverviewView {
        range,
        empty,
        message: no_data_message(empty),
        summary,
        cards,
        type_performance,
        ctr_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricRecord;
    use chrono::NaiveDate;

    fn table() -> MetricsTable {
        let row = |day: u32, content_type: &str, page: &str, clicks: u64, ctr: f64, position: f64| {
            MetricRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                content_type: content_type.to_string(),
                page: page.to_string(),
                clicks,
                impressions: 100,
                ctr,
                position,
            }
        };
        MetricsTable::from_records(vec![
            row(1, "A", "p1", 10, 0.1, 5.0),
            row(2, "A", "p2", 20, 0.2, 3.0),
            row(3, "B", "p3", 1500, 0.5, 1.0),
        ])
    }

    #[test]
    fn test_cards_for_two_row_example() {
        let table = table();
        let range = DateRange::parse("2024-01-01", "2024-01-02").unwrap();
        let view = overview(&table, &OverviewParams { range: Some(range) });

        let values: Vec<_> = view.cards.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["30", "200", "15.00%", "4.00"]);
        assert_eq!(view.cards[0].color, "#0d0887");
        assert_eq!(view.cards[3].color, palette_color(6));
        assert!(!view.empty);
    }

    #[test]
    fn test_default_range_covers_everything() {
        let view = overview(&table(), &OverviewParams::default());
        assert_eq!(view.cards[0].value, "1,530");
        assert_eq!(view.type_performance.series.len(), 2);
        assert_eq!(view.ctr_distribution.series.len(), 2);
    }

    #[test]
    fn test_inverted_range_renders_no_data() {
        let range = DateRange::parse("2024-01-03", "2024-01-01").unwrap();
        let view = overview(&table(), &OverviewParams { range: Some(range) });

        assert!(view.empty);
        assert!(view.message.is_some());
        assert_eq!(view.cards[0].value, "0");
        assert_eq!(view.cards[2].value, "N/A");
        assert_eq!(view.cards[3].value, "N/A");
        assert!(view.type_performance.is_empty());
        assert!(view.ctr_distribution.is_empty());
    }
}
