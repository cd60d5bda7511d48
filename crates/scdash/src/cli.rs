//! Terminal output for the `summary` and `export` commands

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use scdash_core::views::{format_optional, format_thousands};
use scdash_core::{CoreError, DateRange, MetricsTable, SummaryReport};

/// Range from `--start`/`--end`, filling gaps from the table's own span
///
/// `None` when a bound is missing and the table is empty.
pub fn resolve_range(
    table: &MetricsTable,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<DateRange>, CoreError> {
    DateRange::resolve(start, end, ("--start", "--end"), table.full_range())
}

/// Format a summary report as a table (human) or JSON
pub fn format_summary(report: &SummaryReport, json: bool, no_color: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }

    let summary = &report.summary;
    if summary.is_empty() {
        return Ok("No data available for the selected date range.".to_string());
    }

    let mut out = String::new();
    if let Some(range) = &report.range {
        out.push_str(&format!("Search Console Summary ({})\n", range));
    }

    let mut totals = Table::new();
    totals.set_content_arrangement(ContentArrangement::Dynamic);
    totals.add_row(Row::from(vec![
        "Total Clicks".to_string(),
        format_thousands(summary.total_clicks),
    ]));
    totals.add_row(Row::from(vec![
        "Total Impressions".to_string(),
        format_thousands(summary.total_impressions),
    ]));
    totals.add_row(Row::from(vec![
        "Average CTR".to_string(),
        format_optional(summary.avg_ctr, 2, "%"),
    ]));
    totals.add_row(Row::from(vec![
        "Average Position".to_string(),
        format_optional(summary.avg_position, 1, ""),
    ]));
    totals.add_row(Row::from(vec![
        "Rows / Pages".to_string(),
        format!("{} / {}", summary.row_count, summary.distinct_pages),
    ]));
    out.push_str(&totals.to_string());
    out.push('\n');

    let headers = ["Type", "Clicks", "Impressions", "CTR", "Position", "Pages"];
    let mut per_type = Table::new();
    per_type.set_content_arrangement(ContentArrangement::Dynamic);
    if no_color {
        per_type.set_header(headers.to_vec());
    } else {
        per_type.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }

    for row in &report.per_type {
        per_type.add_row(Row::from(vec![
            row.content_type.clone(),
            format_thousands(row.clicks),
            format_thousands(row.impressions),
            format_optional(row.avg_ctr, 2, "%"),
            format_optional(row.avg_position, 1, ""),
            row.pages.to_string(),
        ]));
    }
    out.push_str(&per_type.to_string());

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scdash_core::models::parse_iso_date;
    use scdash_core::{summary_report, MetricRecord};

    fn record(date: &str, content_type: &str, clicks: u64, impressions: u64) -> MetricRecord {
        MetricRecord {
            date: parse_iso_date(date).unwrap(),
            content_type: content_type.to_string(),
            page: format!("/{}/{}", content_type, date),
            clicks,
            impressions,
            ctr: 0.0,
            position: 4.0,
        }
    }

    fn table() -> MetricsTable {
        MetricsTable::from_records(vec![
            record("2024-03-01", "blog", 1200, 10000),
            record("2024-03-05", "docs", 30, 600),
        ])
    }

    #[test]
    fn test_resolve_range_defaults_to_table_bounds() {
        let range = resolve_range(&table(), None, None).unwrap().unwrap();
        assert_eq!(range.to_string(), "2024-03-01 to 2024-03-05");
    }

    #[test]
    fn test_resolve_range_fills_missing_bound() {
        let range = resolve_range(&table(), Some("2024-03-03"), None)
            .unwrap()
            .unwrap();
        assert_eq!(range.to_string(), "2024-03-03 to 2024-03-05");
    }

    #[test]
    fn test_resolve_range_rejects_bad_date() {
        let err = resolve_range(&table(), Some("03/01/2024"), None).unwrap_err();
        assert!(err.is_user_error());
        assert!(err.to_string().contains("--start"));
    }

    #[test]
    fn test_resolve_range_empty_table() {
        let empty = MetricsTable::from_records(Vec::new());
        assert!(resolve_range(&empty, None, None).unwrap().is_none());
    }

    #[test]
    fn test_format_summary_table() {
        let report = summary_report(&table(), None);
        let out = format_summary(&report, false, true).unwrap();

        assert!(out.contains("2024-03-01 to 2024-03-05"));
        assert!(out.contains("1,230"));
        assert!(out.contains("blog"));
        assert!(out.contains("docs"));
    }

    #[test]
    fn test_format_summary_json() {
        let report = summary_report(&table(), None);
        let out = format_summary(&report, true, true).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(json["summary"]["total_clicks"], 1230);
        assert_eq!(json["per_type"][0]["type"], "blog");
    }

    #[test]
    fn test_format_summary_empty() {
        let empty = MetricsTable::from_records(Vec::new());
        let report = summary_report(&empty, None);
        let out = format_summary(&report, false, true).unwrap();
        assert!(out.starts_with("No data"));
    }
}
