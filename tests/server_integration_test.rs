//! Router-level tests: health, presets, body handling.

mod common;

use axum::http::StatusCode;
use common::{assert_json_error, assert_ok, assert_status, TestApp};
use stipple::models::AppConfig;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.get("/health").await;
    assert_ok(&response);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_list_presets() {
    let app = TestApp::new();
    let response = app.get("/api/presets").await;
    assert_ok(&response);

    let json: serde_json::Value = response.json();
    let names: Vec<&str> = json["presets"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert!(names.contains(&"classic"));
    assert!(names.contains(&"newspaper"));
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[tokio::test]
async fn test_get_preset() {
    let app = TestApp::new();
    let response = app.get("/api/presets/classic").await;
    assert_ok(&response);

    let json: serde_json::Value = response.json();
    assert_eq!(json["algorithm"], "floydSteinberg");
    assert_eq!(json["params"]["dot_size"], 3);
}

#[tokio::test]
async fn test_get_unknown_preset() {
    let app = TestApp::new();
    let response = app.get("/api/presets/sepia").await;
    assert_json_error(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_presets_from_config() {
    let config = AppConfig::from_yaml("presets:\n  only:\n    algorithm: riemersma\n").unwrap();
    let app = TestApp::with_config(config);

    let json: serde_json::Value = app.get("/api/presets").await.json();
    assert_eq!(json["presets"], serde_json::json!(["only"]));
}

#[tokio::test]
async fn test_list_algorithms() {
    let app = TestApp::new();
    let response = app.get("/api/algorithms").await;
    assert_ok(&response);

    let json: serde_json::Value = response.json();
    let algorithms = json["algorithms"].as_array().unwrap();
    assert_eq!(algorithms.len(), 16);
    assert!(algorithms.contains(&serde_json::json!("directBinarySearch")));
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = TestApp::new();
    let response = app.post_raw("/api/process", "{ not json").await;
    assert_json_error(&response, StatusCode::BAD_REQUEST);

    let response = app.post_raw("/api/detect", "{}").await;
    assert_json_error(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_body_limit() {
    let mut config = AppConfig::default();
    config.limits.max_body_bytes = 64;
    let app = TestApp::with_config(config);

    let body = format!("{{\"image\": \"{}\"}}", "A".repeat(1024));
    let response = app.post_raw("/api/process", &body).await;
    assert_status(&response, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new();
    let response = app.get("/api/nothing").await;
    assert_status(&response, StatusCode::NOT_FOUND);
}
