//! Metrics engine
//!
//! Pure aggregation over a [`Slice`](crate::models::Slice): totals and
//! ratios, time-bucketed series, per-type group-bys, weekday and monthly
//! averages, smoothing and period comparison.
//!
//! Ratios whose denominator can be zero return `Option<f64>`; `None` is
//! the "no data" marker every caller renders as `N/A`.

pub mod calendar;
pub mod comparison;
pub mod grouping;
pub mod smoothing;
pub mod summary;
pub mod timeseries;


pub use calendar::{
    monthly_average, weekday_average, weekday_name, MonthlyPoint, WeekdayAverage, WEEKDAYS,
};
pub use comparison::{percent_change, period_type_means};
pub use grouping::{
    describe_by_type, per_type_aggregate, AggFn, AggSpec, AggregateRow, AggregateTable, Column,
    Stats, TypeStats,
};
pub use smoothing::moving_average;
pub use summary::{mean, ratio_percent, summarize, AggregateSummary};
pub use timeseries::{
    daily_totals, daily_type_metrics, time_series, DailyTotals, DailyTypeMetrics, TimeSeries,
    TimeSeriesPoint,
};
