use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stipple_dither::{BoundingBox, Request};

use super::image::{decode_image, expect_regions, json_body};
use crate::error::ApiError;
use crate::models::AppConfig;
use crate::services::WorkerPool;

/// Body of `POST /api/detect`. Omitted settings come from the config.
#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub image: String,
    #[serde(default)]
    pub sensitivity: Option<f32>,
    #[serde(default)]
    pub min_size: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetectResponse {
    pub regions: Vec<BoundingBox>,
}

/// Find edge-bounded regions that could be given their own algorithm.
pub async fn handle_detect(
    State(config): State<Arc<AppConfig>>,
    State(workers): State<Arc<WorkerPool>>,
    payload: Result<Json<DetectRequest>, JsonRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    let body = json_body(payload)?;
    let sensitivity = body.sensitivity.unwrap_or(config.detection.sensitivity);
    let min_size = body.min_size.unwrap_or(config.detection.min_size);

    let pixels = decode_image(body.image, config.limits.max_pixels).await?;

    let response = workers
        .submit(Request::DetectRegions {
            pixels,
            sensitivity,
            min_size,
        })
        .await?;
    let regions = expect_regions(response)?;

    tracing::info!(sensitivity, min_size, found = regions.len(), "Regions detected");

    Ok(Json(DetectResponse { regions }))
}
