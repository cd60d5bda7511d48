//! Calendar-based averages: day of week and month

use chrono::{Datelike, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

use super::summary::mean;
use crate::models::{Metric, Slice};

/// Fixed Monday-first order used by every weekday output
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Average of a metric on one day of the week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayAverage {
    #[serde(skip)]
    pub weekday: Weekday,
    pub day: &'static str,
    /// `None` when the slice has no row on this weekday
    pub value: Option<f64>,
}

/// Mean of `metric` per weekday; always seven entries, Monday first
pub fn weekday_average(slice: &Slice<'_>, metric: Metric) -> Vec<WeekdayAverage> {
    let mut buckets: [Vec<f64>; 7] = Default::default();
    for record in slice.iter() {
        buckets[record.date.weekday().num_days_from_monday() as usize].push(record.value(metric));
    }

    WEEKDAYS
        .iter()
        .zip(buckets)
        .map(|(&weekday, values)| WeekdayAverage {
            weekday,
            day: weekday_name(weekday),
            value: mean(values),
        })
        .collect()
}

/// Average of a metric for one type in one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    /// `YYYY-MM`
    pub month: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: f64,
}

/// Mean of `metric` per (month, type), ordered by month then type
pub fn monthly_average(slice: &Slice<'_>, metric: Metric) -> Vec<MonthlyPoint> {
    let mut groups: BTreeMap<(String, &str), Vec<f64>> = BTreeMap::new();
    for record in slice.iter() {
        groups
            .entry((
                record.date.format("%Y-%m").to_string(),
                record.content_type.as_str(),
            ))
            .or_default()
            .push(record.value(metric));
    }

    groups
        .into_iter()
        .filter_map(|((month, content_type), values)| {
            Some(MonthlyPoint {
                month,
                content_type: content_type.to_string(),
                value: mean(values)?,
            })
        })
        .collect()
}
