//! Data models for scdash

pub mod record;
pub mod table;

pub use record::{parse_calendar_date, parse_iso_date, Bucket, Metric, MetricRecord};
pub use table::{DateRange, MetricsTable, Slice};
