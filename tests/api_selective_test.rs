//! Integration tests for POST /api/selective

mod common;

use axum::http::StatusCode;
use common::fixtures::{flat, gradient, png_base64};
use common::{assert_channels_within, assert_json_error, assert_png, TestApp};
use serde_json::json;
use stipple::models::AppConfig;

#[tokio::test]
async fn test_selective_without_regions_matches_default_algorithm() {
    let app = TestApp::new();
    let image = png_base64(&gradient(40, 20));

    let selective = app
        .post_json(
            "/api/selective",
            &json!({ "image": image, "regions": [], "default_algorithm": "burkes" }),
        )
        .await;
    let direct = app
        .post_json("/api/process", &json!({ "image": image, "algorithm": "burkes" }))
        .await;

    assert_png(&selective);
    assert_png(&direct);
    assert_eq!(selective.pixels(), direct.pixels());
}

#[tokio::test]
async fn test_full_region_matches_region_algorithm() {
    let app = TestApp::new();
    let image = png_base64(&gradient(30, 30));

    let selective = app
        .post_json(
            "/api/selective",
            &json!({
                "image": image,
                "default_algorithm": "floydSteinberg",
                "regions": [
                    { "type": "rectangle", "x1": 0.0, "y1": 0.0, "x2": 1.0, "y2": 1.0, "algorithm": "ordered" }
                ]
            }),
        )
        .await;
    let direct = app
        .post_json("/api/process", &json!({ "image": image, "algorithm": "ordered" }))
        .await;

    assert_png(&selective);
    assert_eq!(selective.pixels(), direct.pixels());
}

#[tokio::test]
async fn test_adjustments_apply_under_regions() {
    let app = TestApp::new();
    let image = png_base64(&flat(40, 40, 255));

    // Inverted white is black under every algorithm, region or not.
    let response = app
        .post_json(
            "/api/selective",
            &json!({
                "image": image,
                "default_algorithm": "ordered",
                "adjustments": { "invert": true },
                "regions": [
                    { "name": "left", "type": "rectangle", "x1": 0.0, "y1": 0.0, "x2": 0.5, "y2": 1.0, "algorithm": "atkinson" }
                ]
            }),
        )
        .await;

    assert_png(&response);
    let pixels = response.pixels();
    assert_eq!((pixels.width(), pixels.height()), (40, 40));
    assert_channels_within(&pixels, &[0]);
}

#[tokio::test]
async fn test_feathered_circle_is_accepted() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/selective",
            &json!({
                "image": png_base64(&gradient(50, 50)),
                "default_algorithm": "halftone",
                "regions": [
                    { "type": "circle", "center_x": 0.5, "center_y": 0.5, "radius": 0.3,
                      "feather": 0.25, "algorithm": "blueNoise", "params": { "seed": 3 } }
                ]
            }),
        )
        .await;

    assert_png(&response);
}

#[tokio::test]
async fn test_bad_geometry_is_400() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/selective",
            &json!({
                "image": png_base64(&flat(8, 8, 0)),
                "default_algorithm": "ordered",
                "regions": [
                    { "type": "polygon", "vertices": [[0.0, 0.0], [1.0, 1.0]], "algorithm": "ordered" }
                ]
            }),
        )
        .await;

    assert_json_error(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_feather_out_of_range_is_400() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/selective",
            &json!({
                "image": png_base64(&flat(8, 8, 0)),
                "default_algorithm": "ordered",
                "regions": [
                    { "type": "circle", "center_x": 0.5, "center_y": 0.5, "radius": 0.2,
                      "feather": 0.9, "algorithm": "ordered" }
                ]
            }),
        )
        .await;

    assert_json_error(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_selective_default_is_400() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/selective",
            &json!({ "image": png_base64(&flat(8, 8, 0)), "default_algorithm": "selective" }),
        )
        .await;

    assert_json_error(&response, StatusCode::BAD_REQUEST);
}

fn whole_image(algorithm: &str) -> serde_json::Value {
    json!({ "type": "rectangle", "x1": 0.0, "y1": 0.0, "x2": 1.0, "y2": 1.0, "algorithm": algorithm })
}

#[tokio::test]
async fn test_region_count_limit_is_400() {
    let mut config = AppConfig::default();
    config.limits.max_regions = 3;
    let app = TestApp::with_config(config);
    let image = png_base64(&gradient(16, 8));

    let regions: Vec<_> = (0..4).map(|_| whole_image("random")).collect();
    let response = app
        .post_json(
            "/api/selective",
            &json!({ "image": image, "default_algorithm": "ordered", "regions": regions }),
        )
        .await;
    assert_json_error(&response, StatusCode::BAD_REQUEST);
    assert!(response.text().contains("regions"));

    let regions: Vec<_> = (0..3).map(|_| whole_image("random")).collect();
    let response = app
        .post_json(
            "/api/selective",
            &json!({ "image": image, "default_algorithm": "ordered", "regions": regions }),
        )
        .await;
    assert_png(&response);
}

#[tokio::test]
async fn test_dbs_region_respects_pixel_limit() {
    let mut config = AppConfig::default();
    config.limits.max_dbs_pixels = 64;
    let app = TestApp::with_config(config);

    let response = app
        .post_json(
            "/api/selective",
            &json!({
                "image": png_base64(&gradient(16, 8)),
                "default_algorithm": "ordered",
                "regions": [whole_image("directBinarySearch")]
            }),
        )
        .await;
    assert_json_error(&response, StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            "/api/selective",
            &json!({
                "image": png_base64(&gradient(16, 8)),
                "default_algorithm": "directBinarySearch",
                "regions": []
            }),
        )
        .await;
    assert_json_error(&response, StatusCode::BAD_REQUEST);
}
