//! scdash-core - Core library for scdash
//!
//! Provides the in-memory metrics table, the aggregation engine, chart
//! builders and the view controllers behind the dashboard pages.

pub mod analytics;
pub mod charts;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod store;
pub mod views;

pub use config::DashboardConfig;
pub use error::{CoreError, ExportError, LoadError};
pub use export::{
    export, export_to_path, summary_report, ExportFormat, ExportPayload, SummaryReport,
    EXPORT_FORMAT_VERSION,
};
pub use models::{Bucket, DateRange, Metric, MetricRecord, MetricsTable, Slice};
pub use store::{load, load_from_reader};
