//! Integration tests for the JSON API

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use scdash_core::load_from_reader;
use scdash_web::AppState;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

const CSV: &str = "\
date,type,page,clicks,impressions,ctr,position
2024-01-01,blog,/blog/a,10,100,0.1,5.0
2024-01-02,blog,/blog/b,20,100,0.2,3.0
2024-01-02,docs,/docs/a,5,50,0.1,8.0
2024-02-05,blog,/blog/a,30,120,0.25,2.0
2024-02-06,docs,/docs/b,0,40,0.0,12.0
";

const HEADER_ONLY: &str = "date,type,page,clicks,impressions,ctr,position\n";

fn router_for(csv: &str) -> Router {
    let table = load_from_reader(csv.as_bytes(), Path::new("fixture.csv")).unwrap();
    scdash_web::create_router(Arc::new(AppState::with_defaults(table)))
}

fn router() -> Router {
    router_for(CSV)
}

async fn get(uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    send(router(), uri).await
}

async fn send(router: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body.to_vec())
}

async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = get(uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_reports_loaded_rows() {
    let (status, json) = get_json("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["rows"], 5);
    assert_eq!(json["types"], serde_json::json!(["blog", "docs"]));
    assert_eq!(json["range"]["start"], "2024-01-01");
}

#[tokio::test]
async fn test_index_serves_html() {
    let (status, headers, body) = get("/").await;

    assert_eq!(status, StatusCode::OK);
    let content_type = headers.get("content-type").and_then(|v| v.to_str().ok());
    assert!(content_type.unwrap().contains("text/html"));
    assert!(String::from_utf8(body).unwrap().contains("/api/overview"));
}

#[tokio::test]
async fn test_overview_defaults_to_full_range() {
    let (status, json) = get_json("/api/overview").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["empty"], false);
    assert_eq!(json["summary"]["total_clicks"], 65);
    assert_eq!(json["range"]["end"], "2024-02-06");
}

#[tokio::test]
async fn test_overview_with_explicit_range() {
    let (status, json) = get_json("/api/overview?start=2024-01-01&end=2024-01-01").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["summary"]["total_clicks"], 10);
    assert_eq!(json["cards"][2]["value"], "10.00%");
}

#[tokio::test]
async fn test_overview_empty_range_is_not_an_error() {
    let (status, json) = get_json("/api/overview?start=2023-01-01&end=2023-01-31").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["empty"], true);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_bad_date_is_rejected() {
    let (status, json) = get_json("/api/overview?start=yesterday").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("start"));
}

#[tokio::test]
async fn test_unknown_metric_is_rejected() {
    let (status, json) = get_json("/api/time-analysis?metric=bounces").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_time_analysis_with_moving_average() {
    let (status, json) = get_json("/api/time-analysis?metric=clicks&moving_average=true&window=3").await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json["time_chart"]["series"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert!(names.contains(&"blog"));
    assert!(names.contains(&"blog (3-day MA)"));
}

#[tokio::test]
async fn test_time_analysis_zero_window_is_rejected() {
    let (status, _) = get_json("/api/time-analysis?moving_average=true&window=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_comparison_uses_default_periods() {
    let (status, json) = get_json("/api/comparison").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["period1"]["start"], "2024-01-01");
    assert_eq!(json["period2"]["end"], "2024-02-06");
    // clicks and impressions for blog and docs
    assert_eq!(json["rows"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_comparison_explicit_periods_and_metrics() {
    let (status, json) = get_json(
        "/api/comparison?p1_start=2024-01-01&p1_end=2024-01-31\
         &p2_start=2024-02-01&p2_end=2024-02-29&metrics=position",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["type"], "blog");
    assert_eq!(rows[0]["metric"], "position");
    assert_eq!(rows[0]["change_pct"], -50.0);
}

#[tokio::test]
async fn test_comparison_on_empty_table_renders_no_data() {
    let (status, _, body) = send(router_for(HEADER_ONLY), "/api/comparison").await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["empty"], true);
    assert!(json["message"].is_string());
    assert!(json["period1"].is_null());
    assert_eq!(json["rows"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_comparison_on_empty_table_with_explicit_periods() {
    let (status, _, body) = send(
        router_for(HEADER_ONLY),
        "/api/comparison?p1_start=2024-01-01&p1_end=2024-01-31\
         &p2_start=2024-02-01&p2_end=2024-02-29",
    )
    .await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["empty"], true);
    assert_eq!(json["period1"]["start"], "2024-01-01");
}

#[tokio::test]
async fn test_comparison_half_period_on_empty_table_is_rejected() {
    let (status, _, _) = send(router_for(HEADER_ONLY), "/api/comparison?p1_start=2024-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_every_view_on_empty_table_is_ok() {
    for uri in [
        "/api/overview",
        "/api/detailed-metrics",
        "/api/time-analysis",
        "/api/explore",
    ] {
        let (status, _, body) = send(router_for(HEADER_ONLY), uri).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(json["empty"], true, "{}", uri);
    }
}

#[tokio::test]
async fn test_us_style_date_is_rejected() {
    let (status, json) = get_json("/api/overview?start=01/01/2024").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("start"));
}

#[tokio::test]
async fn test_detailed_and_explore_respond() {
    let (status, json) = get_json("/api/detailed-metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["figure"]["panels"].as_array().unwrap().len(), 6);

    let (status, json) = get_json("/api/explore").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["empty"], false);
}

#[tokio::test]
async fn test_export_csv_download() {
    let (status, headers, body) = get("/api/export?format=csv").await;

    assert_eq!(status, StatusCode::OK);
    let content_type = headers.get("content-type").and_then(|v| v.to_str().ok());
    assert!(content_type.unwrap().contains("text/csv"));
    let disposition = headers
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(disposition.contains("scdash-export.csv"));

    let text = String::from_utf8(body).unwrap();
    assert!(text.starts_with("date,type,page,clicks,impressions,ctr,position"));
    assert_eq!(text.lines().count(), 6);
}

#[tokio::test]
async fn test_export_summary_json() {
    let (status, json) = get_json("/api/export?format=json&summary=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["format_version"], 1);
    assert_eq!(json["kind"], "summary");
}

#[tokio::test]
async fn test_export_pdf_not_implemented() {
    let (status, json) = get_json("/api/export?format=pdf").await;

    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert!(json["error"].as_str().unwrap().contains("pdf"));
}

#[tokio::test]
async fn test_export_xlsx_download() {
    let (status, headers, body) = get("/api/export?format=xlsx").await;

    assert_eq!(status, StatusCode::OK);
    let content_type = headers.get("content-type").and_then(|v| v.to_str().ok());
    assert!(content_type.unwrap().contains("spreadsheetml"));
    let disposition = headers
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(disposition.contains("scdash-export.xlsx"));
    assert_eq!(&body[..4], b"PK\x03\x04");
}

#[tokio::test]
async fn test_export_unknown_format_is_rejected() {
    let (status, _) = get_json("/api/export?format=docx").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
