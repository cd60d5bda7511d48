//! Loads the metrics CSV into a [`MetricsTable`]
//!
//! Loading happens once at startup. Any failure is fatal: there is no
//! partial load and no retry.

use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::LoadError;
use crate::models::{parse_calendar_date, MetricRecord, MetricsTable};

/// Columns every source file must provide
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "date",
    "type",
    "page",
    "clicks",
    "impressions",
    "ctr",
    "position",
];

/// Row as it appears in the file, before type coercion
#[derive(Debug, Deserialize)]
struct RawRecord {
    date: String,
    #[serde(rename = "type")]
    content_type: String,
    page: String,
    clicks: f64,
    impressions: f64,
    ctr: f64,
    position: f64,
}

impl RawRecord {
    fn into_record(self) -> Result<MetricRecord, String> {
        let date = parse_calendar_date(&self.date)
            .ok_or_else(|| format!("unparsable date '{}'", self.date))?;

        Ok(MetricRecord {
            date,
            content_type: self.content_type,
            page: self.page,
            clicks: to_count("clicks", self.clicks)?,
            impressions: to_count("impressions", self.impressions)?,
            ctr: self.ctr,
            position: self.position,
        })
    }
}

/// Counts may arrive as `10` or `10.0`; anything else is rejected
fn to_count(column: &str, value: f64) -> Result<u64, String> {
    if !(value.is_finite() && value >= 0.0 && value.fract() == 0.0) {
        return Err(format!("{} must be a non-negative integer, got {}", column, value));
    }
    // u64::MAX rounds up to 2^64 as f64, so the bound is exclusive
    if value >= u64::MAX as f64 {
        return Err(format!("{} is out of range, got {}", column, value));
    }
    Ok(value as u64)
}

/// Load the metrics table from a CSV file
pub fn load(path: &Path) -> Result<MetricsTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|source| LoadError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let table = load_from_reader(file, path)?;

    info!(
        path = %path.display(),
        rows = table.len(),
        types = table.types().len(),
        "Loaded metrics table"
    );

    Ok(table)
}

/// Load the metrics table from any reader; `source` names it in errors
pub fn load_from_reader<R: Read>(reader: R, source: &Path) -> Result<MetricsTable, LoadError> {
    let source: PathBuf = source.to_path_buf();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Csv {
            path: source.clone(),
            source: e,
        })?
        .clone();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn {
                path: source,
                column: column.to_string(),
            });
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| LoadError::Csv {
            path: source.clone(),
            source: e,
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let raw: RawRecord = row
            .deserialize(Some(&headers))
            .map_err(|e| LoadError::InvalidRecord {
                path: source.clone(),
                line,
                message: e.to_string(),
            })?;

        let record = raw.into_record().map_err(|message| LoadError::InvalidRecord {
            path: source.clone(),
            line,
            message,
        })?;
        records.push(record);
    }

    debug!(rows = records.len(), "Parsed CSV records");

    Ok(MetricsTable::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
date,type,page,clicks,impressions,ctr,position
2024-01-01,A,p1,10,100,0.10,5
2024-01-02,A,p2,20,100,0.20,3
";

    fn load_str(csv: &str) -> Result<MetricsTable, LoadError> {
        load_from_reader(csv.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn test_load_sample() {
        let table = load_str(SAMPLE).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.types(), &["A"]);
        let first = &table.records()[0];
        assert_eq!(first.date.to_string(), "2024-01-01");
        assert_eq!(first.clicks, 10);
        assert_eq!(first.page, "p1");
    }

    #[test]
    fn test_column_order_and_extra_columns() {
        let csv = "\
extra,position,ctr,impressions,clicks,page,type,date
x,2.5,0.5,10,5,/home,landing,2024-02-01 00:00:00
";
        let table = load_str(csv).unwrap();
        let record = &table.records()[0];
        assert_eq!(record.content_type, "landing");
        assert_eq!(record.impressions, 10);
        assert_eq!(record.position, 2.5);
        assert_eq!(record.date.to_string(), "2024-02-01");
    }

    #[test]
    fn test_float_counts_are_coerced() {
        let csv = "\
date,type,page,clicks,impressions,ctr,position
2024-01-01,A,p1,10.0,100.0,0.1,5
";
        let table = load_str(csv).unwrap();
        assert_eq!(table.records()[0].clicks, 10);
    }

    #[test]
    fn test_missing_column() {
        let csv = "date,type,page,clicks,impressions,ctr\n2024-01-01,A,p1,1,2,0.5\n";
        match load_str(csv) {
            Err(LoadError::MissingColumn { column, .. }) => assert_eq!(column, "position"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_reports_line() {
        let csv = "\
date,type,page,clicks,impressions,ctr,position
2024-01-01,A,p1,10,100,0.10,5
not-a-date,A,p2,20,100,0.20,3
";
        match load_str(csv) {
            Err(LoadError::InvalidRecord { line, message, .. }) => {
                assert_eq!(line, 3);
                assert!(message.contains("not-a-date"));
            }
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_count_rejected() {
        let csv = "\
date,type,page,clicks,impressions,ctr,position
2024-01-01,A,p1,-1,100,0.10,5
";
        assert!(matches!(
            load_str(csv),
            Err(LoadError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_oversized_count_rejected() {
        let csv = "\
date,type,page,clicks,impressions,ctr,position
2024-01-01,A,p1,1e30,100,0.10,5
";
        match load_str(csv) {
            Err(LoadError::InvalidRecord { message, .. }) => assert!(message.contains("out of range")),
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
        assert_eq!(to_count("clicks", 1e15), Ok(1_000_000_000_000_000));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let table = load(file.path()).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_header_only_gives_empty_table() {
        let table = load_str("date,type,page,clicks,impressions,ctr,position\n").unwrap();
        assert!(table.is_empty());
        assert!(table.full_range().is_none());
    }
}
