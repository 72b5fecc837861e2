//! Integration tests for POST /api/detect

mod common;

use axum::http::StatusCode;
use common::fixtures::{flat, png_base64, square_on_noise};
use common::{assert_json_error, assert_ok, TestApp};
use serde_json::json;
use stipple::api::DetectResponse;
use stipple_dither::BoundingBox;

#[tokio::test]
async fn test_detects_square() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/detect",
            &json!({
                "image": png_base64(&square_on_noise(200, 50, 150, 11)),
                "sensitivity": 30.0,
                "min_size": 5000
            }),
        )
        .await;

    assert_ok(&response);
    let body: DetectResponse = response.json();
    assert_eq!(body.regions.len(), 1, "{:?}", body.regions);
    let found = body.regions[0];
    assert!(found.x1.abs_diff(50) <= 2, "{found:?}");
    assert!(found.y1.abs_diff(50) <= 2, "{found:?}");
    assert!(found.x2.abs_diff(149) <= 2, "{found:?}");
    assert!(found.y2.abs_diff(149) <= 2, "{found:?}");
}

#[tokio::test]
async fn test_uniform_image_uses_config_defaults() {
    let app = TestApp::new();

    // 30x20 = 600 pixels, above the default min_size of 500.
    let response = app
        .post_json("/api/detect", &json!({ "image": png_base64(&flat(30, 20, 90)) }))
        .await;

    assert_ok(&response);
    let body: DetectResponse = response.json();
    assert_eq!(
        body.regions,
        vec![BoundingBox {
            x1: 0,
            y1: 0,
            x2: 29,
            y2: 19
        }]
    );
}

#[tokio::test]
async fn test_small_image_has_no_regions() {
    let app = TestApp::new();

    let response = app
        .post_json("/api/detect", &json!({ "image": png_base64(&flat(10, 10, 90)) }))
        .await;

    assert_ok(&response);
    let json: serde_json::Value = response.json();
    assert_eq!(json["regions"], json!([]));
}

#[tokio::test]
async fn test_negative_sensitivity_is_400() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/detect",
            &json!({ "image": png_base64(&flat(10, 10, 90)), "sensitivity": -1.0 }),
        )
        .await;

    assert_json_error(&response, StatusCode::BAD_REQUEST);
}
