//! A single search-console row and the enums used to address its columns

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// One row of the metrics table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub date: NaiveDate,
    /// Content type label (the `type` column)
    #[serde(rename = "type")]
    pub content_type: String,
    pub page: String,
    pub clicks: u64,
    pub impressions: u64,
    /// Click-through rate as given in the source file
    pub ctr: f64,
    /// Average search ranking position
    pub position: f64,
}

impl MetricRecord {
    /// Numeric value of a metric column for this row
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Clicks => self.clicks as f64,
            Metric::Impressions => self.impressions as f64,
            Metric::Ctr => self.ctr,
            Metric::Position => self.position,
        }
    }
}

/// Numeric metric columns a view can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Clicks,
    Impressions,
    Ctr,
    Position,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Clicks,
        Metric::Impressions,
        Metric::Ctr,
        Metric::Position,
    ];

    /// Column name as it appears in the CSV and in query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Clicks => "clicks",
            Metric::Impressions => "impressions",
            Metric::Ctr => "ctr",
            Metric::Position => "position",
        }
    }

    /// Display label for titles and table cells
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Clicks => "Clicks",
            Metric::Impressions => "Impressions",
            Metric::Ctr => "CTR",
            Metric::Position => "Position",
        }
    }

    /// Parse a comma separated list ("clicks,ctr"), skipping blanks
    pub fn parse_list(s: &str) -> Result<Vec<Metric>, CoreError> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Metric::from_str)
            .collect()
    }
}

impl FromStr for Metric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clicks" => Ok(Metric::Clicks),
            "impressions" => Ok(Metric::Impressions),
            "ctr" => Ok(Metric::Ctr),
            "position" => Ok(Metric::Position),
            _ => Err(CoreError::invalid_parameter(
                "metric",
                s,
                "expected clicks, impressions, ctr or position",
            )),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time bucket used to group dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    #[default]
    Day,
    /// Monday to Sunday, labelled by the Sunday
    Week,
    /// Calendar month, labelled by its last day
    Month,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Day => "day",
            Bucket::Week => "week",
            Bucket::Month => "month",
        }
    }

    /// Label date of the bucket containing `date`
    pub fn label(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Bucket::Day => date,
            Bucket::Week => {
                let to_sunday = 6 - date.weekday().num_days_from_monday();
                date.checked_add_days(Days::new(u64::from(to_sunday)))
                    .unwrap_or(date)
            }
            Bucket::Month => {
                let (year, month) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1)
                    .and_then(|first_of_next| first_of_next.pred_opt())
                    .unwrap_or(date)
            }
        }
    }
}

impl FromStr for Bucket {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" | "d" => Ok(Bucket::Day),
            "week" | "weekly" | "w" => Ok(Bucket::Week),
            "month" | "monthly" | "m" => Ok(Bucket::Month),
            _ => Err(CoreError::invalid_parameter(
                "bucket",
                s,
                "expected day, week or month",
            )),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict `YYYY-MM-DD`, used for user-supplied range bounds
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parse a source-file date, dropping any time-of-day part
///
/// Accepts `2024-01-31`, `2024-01-31 10:00:00`, `2024-01-31T10:00:00`,
/// RFC 3339 timestamps and `01/31/2024`.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(s, "%m/%d/%Y").ok()
}
