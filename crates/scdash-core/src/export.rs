//! Export of the metrics table and of period summaries
//!
//! `export` turns a payload into bytes in the requested format. CSV is
//! spreadsheet-compatible, JSON is wrapped in a versioned envelope and
//! Markdown is a human-readable report. XLSX is a single-sheet workbook.
//! PDF is recognised but not produced.

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::analytics::{summarize, AggregateSummary};
use crate::error::{CoreError, ExportError};
use crate::models::{DateRange, MetricRecord, MetricsTable, Slice};

/// Version of the JSON export envelope
pub const EXPORT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Markdown,
    Pdf,
    Xlsx,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            other => other.as_str(),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, ExportFormat::Pdf)
    }
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "pdf" => Ok(ExportFormat::Pdf),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            _ => Err(CoreError::invalid_parameter(
                "format",
                s,
                "expected csv, json, markdown, pdf or xlsx",
            )),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals for one content type within a summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeTotals {
    #[serde(rename = "type")]
    pub content_type: String,
    pub clicks: u64,
    pub impressions: u64,
    pub avg_ctr: Option<f64>,
    pub avg_position: Option<f64>,
    pub pages: usize,
}

impl TypeTotals {
    fn from_summary(content_type: impl Into<String>, summary: &AggregateSummary) -> Self {
        Self {
            content_type: content_type.into(),
            clicks: summary.total_clicks,
            impressions: summary.total_impressions,
            avg_ctr: summary.avg_ctr,
            avg_position: summary.avg_position,
            pages: summary.distinct_pages,
        }
    }
}

/// Headline numbers of a date range, overall and per type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub range: Option<DateRange>,
    pub summary: AggregateSummary,
    pub per_type: Vec<TypeTotals>,
}

/// Build a [`SummaryReport`]; no range means the whole table
pub fn summary_report(table: &MetricsTable, range: Option<DateRange>) -> SummaryReport {
    let range = range.or_else(|| table.full_range());
    let slice = match &range {
        Some(r) => table.slice(r),
        None => Slice::default(),
    };

    let per_type = slice
        .types()
        .into_iter()
        .map(|content_type| {
            let rows = slice
                .iter()
                .filter(|r| r.content_type == content_type)
                .collect();
            let summary = summarize(&Slice::from_rows(rows));
            TypeTotals::from_summary(content_type, &summary)
        })
        .collect();

    SummaryReport {
        range,
        summary: summarize(&slice),
        per_type,
    }
}

/// What to export
#[derive(Debug, Clone)]
pub enum ExportPayload<'a> {
    /// Raw rows
    Table(Slice<'a>),
    Summary(SummaryReport),
}

impl ExportPayload<'_> {
    fn kind(&self) -> &'static str {
        match self {
            ExportPayload::Table(_) => "table",
            ExportPayload::Summary(_) => "summary",
        }
    }
}

#[derive(Serialize)]
struct Envelope<'p, T: Serialize> {
    format_version: u32,
    kind: &'static str,
    data: &'p T,
}

/// Serialize `payload` in `format`
pub fn export(format: ExportFormat, payload: &ExportPayload<'_>) -> Result<Vec<u8>, ExportError> {
    if !format.is_supported() {
        return Err(ExportError::Unsupported {
            format: format.to_string(),
        });
    }

    let bytes = match (format, payload) {
        (ExportFormat::Csv, ExportPayload::Table(slice)) => table_csv(slice)?,
        (ExportFormat::Csv, ExportPayload::Summary(report)) => summary_csv(report)?,
        (ExportFormat::Json, ExportPayload::Table(slice)) => {
            let rows: Vec<&MetricRecord> = slice.iter().collect();
            envelope_json(payload.kind(), &rows)?
        }
        (ExportFormat::Json, ExportPayload::Summary(report)) => {
            envelope_json(payload.kind(), report)?
        }
        (ExportFormat::Markdown, ExportPayload::Table(slice)) => table_markdown(slice)?,
        (ExportFormat::Markdown, ExportPayload::Summary(report)) => summary_markdown(report)?,
        (ExportFormat::Xlsx, ExportPayload::Table(slice)) => table_xlsx(slice)?,
        (ExportFormat::Xlsx, ExportPayload::Summary(report)) => summary_xlsx(report)?,
        (ExportFormat::Pdf, _) => {
            return Err(ExportError::Unsupported {
                format: format.to_string(),
            })
        }
    };

    debug!(format = %format, kind = payload.kind(), bytes = bytes.len(), "Exported payload");
    Ok(bytes)
}

/// Export to a file, creating parent directories as needed
pub fn export_to_path(format: ExportFormat, payload: &ExportPayload<'_>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let bytes = export(format, payload)
        .with_context(|| format!("Failed to export {} as {}", payload.kind(), format))?;

    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;

    Ok(())
}

fn envelope_json<T: Serialize>(kind: &'static str, data: &T) -> Result<Vec<u8>, ExportError> {
    let envelope = Envelope {
        format_version: EXPORT_FORMAT_VERSION,
        kind,
        data,
    };
    Ok(serde_json::to_vec_pretty(&envelope)?)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    writer
        .into_inner()
        .map_err(|e| ExportError::CsvFlush(e.to_string()))
}

fn table_csv(slice: &Slice<'_>) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if slice.is_empty() {
        writer.write_record(crate::store::REQUIRED_COLUMNS)?;
    }
    for record in slice.iter() {
        writer.serialize(record)?;
    }
    finish_csv(writer)
}

fn summary_csv(report: &SummaryReport) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["type", "clicks", "impressions", "avg_ctr", "avg_position", "pages"])?;
    let total = TypeTotals::from_summary("total", &report.summary);
    for row in report.per_type.iter().chain(std::iter::once(&total)) {
        writer.write_record([
            row.content_type.clone(),
            row.clicks.to_string(),
            row.impressions.to_string(),
            optional_cell(row.avg_ctr),
            optional_cell(row.avg_position),
            row.pages.to_string(),
        ])?;
    }
    finish_csv(writer)
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_default()
}

/// Sheet holding the raw rows of an xlsx table export
pub const XLSX_TABLE_SHEET: &str = "Analysis";
/// Sheet holding the per-type totals of an xlsx summary export
pub const XLSX_SUMMARY_SHEET: &str = "Summary";

fn table_xlsx(slice: &Slice<'_>) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(XLSX_TABLE_SHEET)?;

    for (col, name) in (0u16..).zip(crate::store::REQUIRED_COLUMNS) {
        sheet.write_string_with_format(0, col, name, &header)?;
    }
    for (row, r) in (1u32..).zip(slice.iter()) {
        sheet.write_string(row, 0, r.date.to_string())?;
        sheet.write_string(row, 1, r.content_type.as_str())?;
        sheet.write_string(row, 2, r.page.as_str())?;
        sheet.write_number(row, 3, r.clicks as f64)?;
        sheet.write_number(row, 4, r.impressions as f64)?;
        sheet.write_number(row, 5, r.ctr)?;
        sheet.write_number(row, 6, r.position)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn summary_xlsx(report: &SummaryReport) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(XLSX_SUMMARY_SHEET)?;

    let columns = ["type", "clicks", "impressions", "avg_ctr", "avg_position", "pages"];
    for (col, name) in (0u16..).zip(columns) {
        sheet.write_string_with_format(0, col, name, &header)?;
    }

    let total = TypeTotals::from_summary("total", &report.summary);
    for (row, t) in (1u32..).zip(report.per_type.iter().chain(std::iter::once(&total))) {
        sheet.write_string(row, 0, t.content_type.as_str())?;
        sheet.write_number(row, 1, t.clicks as f64)?;
        sheet.write_number(row, 2, t.impressions as f64)?;
        // Undefined ratios stay blank
        if let Some(ctr) = t.avg_ctr {
            sheet.write_number(row, 3, ctr)?;
        }
        if let Some(position) = t.avg_position {
            sheet.write_number(row, 4, position)?;
        }
        sheet.write_number(row, 5, t.pages as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn md_escape(s: &str) -> String {
    s.replace('|', "\\|")
}

fn md_optional(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{:.2}{}", v, suffix),
        None => "N/A".to_string(),
    }
}

fn table_markdown(slice: &Slice<'_>) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::new();
    writeln!(out, "# Search Console Data")?;
    writeln!(out)?;
    writeln!(out, "**Rows**: {}", slice.len())?;
    writeln!(out)?;
    writeln!(out, "| Date | Type | Page | Clicks | Impressions | CTR | Position |")?;
    writeln!(out, "|------|------|------|--------|-------------|-----|----------|")?;
    for r in slice.iter() {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {:.4} | {:.2} |",
            r.date,
            md_escape(&r.content_type),
            md_escape(&r.page),
            r.clicks,
            r.impressions,
            r.ctr,
            r.position
        )?;
    }
    Ok(out)
}

fn summary_markdown(report: &SummaryReport) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::new();
    writeln!(out, "# Search Console Summary")?;
    writeln!(out)?;
    match &report.range {
        Some(range) => writeln!(out, "**Period**: {}", range)?,
        None => writeln!(out, "**Period**: no data")?,
    }
    writeln!(out)?;

    let s = &report.summary;
    writeln!(out, "## Totals")?;
    writeln!(out)?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|--------|-------|")?;
    writeln!(out, "| Total Clicks | {} |", s.total_clicks)?;
    writeln!(out, "| Total Impressions | {} |", s.total_impressions)?;
    writeln!(out, "| Average CTR | {} |", md_optional(s.avg_ctr, "%"))?;
    writeln!(out, "| Average Position | {} |", md_optional(s.avg_position, ""))?;
    writeln!(out, "| Distinct Pages | {} |", s.distinct_pages)?;
    writeln!(out)?;

    if !report.per_type.is_empty() {
        writeln!(out, "## By Type")?;
        writeln!(out)?;
        writeln!(out, "| Type | Clicks | Impressions | CTR | Position | Pages |")?;
        writeln!(out, "|------|--------|-------------|-----|----------|-------|")?;
        for t in &report.per_type {
            writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} |",
                md_escape(&t.content_type),
                t.clicks,
                t.impressions,
                md_optional(t.avg_ctr, "%"),
                md_optional(t.avg_position, ""),
                t.pages
            )?;
        }
    }
    Ok(out)
}
