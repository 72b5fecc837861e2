use axum::{extract::rejection::JsonRejection, extract::State, response::Response, Json};
use serde::Deserialize;
use std::sync::Arc;
use stipple_dither::{
    rasterize, AdjustmentParams, Algorithm, AlgorithmParams, DitherError, LayerSpec, MaskRegion,
    Request,
};

use super::image::{decode_image, expect_image, image_response, json_body};
use crate::error::ApiError;
use crate::models::AppConfig;
use crate::services::WorkerPool;

/// Body of `POST /api/selective`.
#[derive(Debug, Deserialize)]
pub struct SelectiveRequest {
    pub image: String,
    /// Applied in order, later regions on top
    #[serde(default)]
    pub regions: Vec<MaskRegion>,
    #[serde(default)]
    pub default_algorithm: Algorithm,
    #[serde(default)]
    pub default_params: AlgorithmParams,
    #[serde(default)]
    pub adjustments: AdjustmentParams,
}

/// Rasterize every region against a `width`×`height` image.
pub fn build_layers(
    regions: &[MaskRegion],
    width: u32,
    height: u32,
) -> Result<Vec<LayerSpec>, DitherError> {
    regions
        .iter()
        .map(|region| {
            Ok(LayerSpec {
                mask: rasterize(region, width, height)?,
                algorithm: region.algorithm,
                params: region.params.clone(),
            })
        })
        .collect()
}

/// Dither an image with per-region algorithms, returning a PNG.
pub async fn handle_selective(
    State(config): State<Arc<AppConfig>>,
    State(workers): State<Arc<WorkerPool>>,
    payload: Result<Json<SelectiveRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = json_body(payload)?;
    config.limits.check_regions(body.regions.len())?;
    let pixels = decode_image(body.image, config.limits.max_pixels).await?;
    let (width, height) = (pixels.width(), pixels.height());
    config.limits.check_dbs(
        std::iter::once(body.default_algorithm).chain(body.regions.iter().map(|r| r.algorithm)),
        pixels.pixel_count() as u64,
    )?;

    tracing::info!(
        regions = body.regions.len(),
        default_algorithm = %body.default_algorithm,
        width,
        height,
        "Selective request received"
    );

    let regions = body.regions;
    let layers = tokio::task::spawn_blocking(move || build_layers(&regions, width, height))
        .await
        .map_err(|e| ApiError::Internal(format!("Mask task failed: {e}")))??;

    let response = workers
        .submit(Request::ProcessSelective {
            pixels,
            layers,
            default_algorithm: body.default_algorithm,
            default_params: body.default_params,
            adjustments: body.adjustments,
        })
        .await?;

    let (pixels, warnings) = expect_image(response)?;
    image_response(pixels, warnings).await
}
