//! Web router using Axum

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use scdash_core::views::{
    comparison, detailed_metrics, explore, overview, time_analysis, ComparisonParams,
    ComparisonView, DetailedParams, DetailedView, ExploreParams, ExploreView, OverviewParams,
    OverviewView, TimeAnalysisParams, TimeAnalysisView,
};
use scdash_core::{
    export, summary_report, Bucket, CoreError, DateRange, ExportFormat, ExportPayload, Metric,
    MetricsTable,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Create the web router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/api/overview", get(overview_handler))
        .route("/api/detailed-metrics", get(detailed_handler))
        .route("/api/time-analysis", get(time_analysis_handler))
        .route("/api/comparison", get(comparison_handler))
        .route("/api/explore", get(explore_handler))
        .route("/api/export", get(export_handler))
        .layer(cors)
        .with_state(state)
}

async fn index_handler() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>scdash</title></head>
<body>
<h1>Search Console Analytics</h1>
<ul>
  <li><a href="/api/overview">/api/overview</a>?start&amp;end</li>
  <li><a href="/api/detailed-metrics">/api/detailed-metrics</a>?start&amp;end</li>
  <li><a href="/api/time-analysis">/api/time-analysis</a>?metric&amp;bucket&amp;moving_average</li>
  <li><a href="/api/comparison">/api/comparison</a>?p1_start&amp;p1_end&amp;p2_start&amp;p2_end&amp;metrics</li>
  <li><a href="/api/explore">/api/explore</a>?start&amp;end</li>
  <li><a href="/api/export?format=csv">/api/export</a>?format&amp;start&amp;end&amp;summary</li>
  <li><a href="/api/health">/api/health</a></li>
</ul>
</body>
</html>"#,
    )
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let table = &state.table;
    Json(serde_json::json!({
        "status": if table.is_empty() { "empty" } else { "healthy" },
        "rows": table.len(),
        "types": table.types(),
        "range": table.full_range(),
    }))
}

#[derive(Debug, Default, Deserialize)]
struct RangeQuery {
    start: Option<String>,
    end: Option<String>,
}

impl RangeQuery {
    /// Explicit bounds, each falling back to the table's own bound
    fn resolve(&self, table: &MetricsTable) -> ApiResult<Option<DateRange>> {
        let range = DateRange::resolve(
            self.start.as_deref(),
            self.end.as_deref(),
            ("start", "end"),
            table.full_range(),
        )?;
        debug!(rows = table.len(), ?range, "Resolved date range");
        Ok(range)
    }
}

async fn overview_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<OverviewView>> {
    let params = OverviewParams {
        range: query.resolve(&state.table)?,
    };
    Ok(Json(overview(&state.table, &params)))
}

async fn detailed_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<DetailedView>> {
    let params = DetailedParams {
        range: query.resolve(&state.table)?,
    };
    Ok(Json(detailed_metrics(&state.table, &params)))
}

async fn explore_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<ExploreView>> {
    let params = ExploreParams {
        range: query.resolve(&state.table)?,
    };
    Ok(Json(explore(&state.table, &params)))
}

#[derive(Debug, Default, Deserialize)]
struct TimeAnalysisQuery {
    metric: Option<String>,
    bucket: Option<String>,
    moving_average: Option<bool>,
    window: Option<usize>,
}

async fn time_analysis_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TimeAnalysisQuery>,
) -> ApiResult<Json<TimeAnalysisView>> {
    let metric = match query.metric.as_deref() {
        Some(m) => m.parse::<Metric>()?,
        None => Metric::Clicks,
    };
    let bucket = match query.bucket.as_deref() {
        Some(b) => b.parse::<Bucket>()?,
        None => Bucket::Day,
    };
    let window = query.window.unwrap_or(state.config.moving_average_window);
    if window == 0 {
        return Err(CoreError::invalid_parameter("window", "0", "must be at least 1").into());
    }

    let params = TimeAnalysisParams {
        metric,
        bucket,
        moving_average: query.moving_average.unwrap_or(false),
        window,
    };
    Ok(Json(time_analysis(&state.table, &params)))
}

#[derive(Debug, Default, Deserialize)]
struct ComparisonQuery {
    p1_start: Option<String>,
    p1_end: Option<String>,
    p2_start: Option<String>,
    p2_end: Option<String>,
    metrics: Option<String>,
}

impl ComparisonQuery {
    fn has_no_bounds(&self) -> bool {
        self.p1_start.is_none()
            && self.p1_end.is_none()
            && self.p2_start.is_none()
            && self.p2_end.is_none()
    }
}

async fn comparison_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ComparisonQuery>,
) -> ApiResult<Json<ComparisonView>> {
    let table = &state.table;
    let defaults = ComparisonParams::defaults_for(table, state.config.comparison_window_days);

    let metrics = match query.metrics.as_deref() {
        Some(list) => Metric::parse_list(list)?,
        None => vec![Metric::Clicks, Metric::Impressions],
    };

    let period1 = DateRange::resolve(
        query.p1_start.as_deref(),
        query.p1_end.as_deref(),
        ("p1_start", "p1_end"),
        defaults.as_ref().map(|d| d.period1),
    )?;
    let period2 = DateRange::resolve(
        query.p2_start.as_deref(),
        query.p2_end.as_deref(),
        ("p2_start", "p2_end"),
        defaults.as_ref().map(|d| d.period2),
    )?;

    let (period1, period2) = match (period1, period2) {
        (Some(p1), Some(p2)) => (p1, p2),
        // Nothing given and no dates to default from
        (None, None) if query.has_no_bounds() => {
            return Ok(Json(ComparisonView::no_data()));
        }
        (None, _) => {
            return Err(CoreError::invalid_parameter(
                "p1_start",
                "",
                "period 1 needs both dates",
            )
            .into())
        }
        (_, None) => {
            return Err(CoreError::invalid_parameter(
                "p2_start",
                "",
                "period 2 needs both dates",
            )
            .into())
        }
    };

    let params = ComparisonParams {
        period1,
        period2,
        metrics,
    };
    Ok(Json(comparison(table, &params)))
}

#[derive(Debug, Default, Deserialize)]
struct ExportQuery {
    format: Option<String>,
    start: Option<String>,
    end: Option<String>,
    summary: Option<bool>,
}

async fn export_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let table = &state.table;
    let format = match query.format.as_deref() {
        Some(f) => f.parse::<ExportFormat>()?,
        None => ExportFormat::Csv,
    };
    let range = RangeQuery {
        start: query.start.clone(),
        end: query.end.clone(),
    }
    .resolve(table)?;

    let payload = if query.summary.unwrap_or(false) {
        ExportPayload::Summary(summary_report(table, range))
    } else {
        ExportPayload::Table(match &range {
            Some(r) => table.slice(r),
            None => table.all(),
        })
    };

    let bytes = export(format, &payload)?;
    let disposition = format!("attachment; filename=\"scdash-export.{}\"", format.extension());

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
