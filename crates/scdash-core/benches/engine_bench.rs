//! Benchmarks for the metrics engine and the view controllers
//!
//! Each view re-runs its aggregation in full per request, so these track
//! the cost of one request at increasing table sizes.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scdash_core::analytics::{moving_average, per_type_aggregate, summarize, time_series, AggFn, AggSpec, Column};
use scdash_core::views::{detailed_metrics, overview, time_analysis, DetailedParams, OverviewParams, TimeAnalysisParams};
use scdash_core::{Bucket, Metric, MetricRecord, MetricsTable};

const TYPES: [&str; 5] = ["blog", "docs", "product", "landing", "support"];

/// Generate `days` days of rows with `pages` pages per type
fn generate_table(days: usize, pages: usize) -> MetricsTable {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let mut records = Vec::with_capacity(days * pages * TYPES.len());
    for day in 0..days {
        let date = start + chrono::Duration::days(day as i64);
        for (t, content_type) in TYPES.iter().enumerate() {
            for page in 0..pages {
                let impressions = 100 + ((day * 7 + page * 13 + t) % 900) as u64;
                let clicks = impressions / (5 + (page % 10) as u64);
                records.push(MetricRecord {
                    date,
                    content_type: content_type.to_string(),
                    page: format!("/{}/{}", content_type, page),
                    clicks,
                    impressions,
                    ctr: clicks as f64 / impressions as f64,
                    position: 1.0 + (page % 20) as f64,
                });
            }
        }
    }
    MetricsTable::from_records(records)
}

fn summarize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");

    for days in [30, 365] {
        let table = generate_table(days, 20);
        group.bench_with_input(BenchmarkId::new("days", days), &table, |b, table| {
            b.iter(|| {
                black_box(summarize(&table.all()));
            });
        });
    }

    group.finish();
}

fn time_series_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_series");
    let table = generate_table(365, 20);

    for bucket in [Bucket::Day, Bucket::Week, Bucket::Month] {
        group.bench_with_input(BenchmarkId::new("bucket", bucket), &bucket, |b, bucket| {
            b.iter(|| {
                black_box(time_series(&table.all(), Metric::Clicks, *bucket));
            });
        });
    }

    group.finish();
}

fn aggregate_benchmark(c: &mut Criterion) {
    let table = generate_table(365, 20);
    let spec = AggSpec::new()
        .with(Column::Clicks, AggFn::Sum)
        .with(Column::Impressions, AggFn::Sum)
        .with(Column::Ctr, AggFn::Mean)
        .with(Column::Page, AggFn::Nunique);

    c.bench_function("per_type_aggregate", |b| {
        b.iter(|| {
            black_box(per_type_aggregate(&table.all(), &spec));
        });
    });

    let series: Vec<f64> = (0..10_000).map(|i| (i % 97) as f64).collect();
    c.bench_function("moving_average_10k", |b| {
        b.iter(|| {
            black_box(moving_average(&series, 7));
        });
    });
}

fn views_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("views");
    let table = generate_table(180, 20);

    group.bench_function("overview", |b| {
        b.iter(|| black_box(overview(&table, &OverviewParams::default())));
    });
    group.bench_function("detailed_metrics", |b| {
        b.iter(|| black_box(detailed_metrics(&table, &DetailedParams::default())));
    });
    group.bench_function("time_analysis_ma", |b| {
        let params = TimeAnalysisParams {
            moving_average: true,
            ..Default::default()
        };
        b.iter(|| black_box(time_analysis(&table, &params)));
    });

    group.finish();
}

criterion_group!(
    benches,
    summarize_benchmark,
    time_series_benchmark,
    aggregate_benchmark,
    views_benchmark
);
criterion_main!(benches);
