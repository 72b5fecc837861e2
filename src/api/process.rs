use axum::{extract::rejection::JsonRejection, extract::State, response::Response, Json};
use serde::Deserialize;
use std::sync::Arc;
use stipple_dither::{AdjustmentParams, Algorithm, AlgorithmParams, Request};

use super::image::{decode_image, expect_image, image_response, json_body};
use crate::error::ApiError;
use crate::models::AppConfig;
use crate::services::WorkerPool;

/// Body of `POST /api/process`.
///
/// Fields given explicitly override those of the named preset.
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    /// Base64 PNG, optionally as a data URL
    pub image: String,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub algorithm: Option<Algorithm>,
    #[serde(default)]
    pub params: Option<AlgorithmParams>,
    #[serde(default)]
    pub adjustments: Option<AdjustmentParams>,
}

impl ProcessRequest {
    /// Merge with the preset, if any, into concrete settings.
    pub fn resolve(
        &self,
        config: &AppConfig,
    ) -> Result<(Algorithm, AlgorithmParams, AdjustmentParams), ApiError> {
        let (algorithm, params, adjustments) = match &self.preset {
            Some(name) => {
                let preset = config
                    .preset(name)
                    .ok_or_else(|| ApiError::UnknownPreset(name.clone()))?;
                (preset.algorithm, preset.params.clone(), preset.adjustments.clone())
            }
            None => Default::default(),
        };

        Ok((
            self.algorithm.unwrap_or(algorithm),
            self.params.clone().unwrap_or(params),
            self.adjustments.clone().unwrap_or(adjustments),
        ))
    }
}

/// Adjust and dither a whole image, returning a PNG.
pub async fn handle_process(
    State(config): State<Arc<AppConfig>>,
    State(workers): State<Arc<WorkerPool>>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = json_body(payload)?;
    let (algorithm, params, adjustments) = body.resolve(&config)?;

    let pixels = decode_image(body.image, config.limits.max_pixels).await?;
    config
        .limits
        .check_dbs([algorithm], pixels.pixel_count() as u64)?;

    tracing::info!(
        algorithm = %algorithm,
        preset = body.preset.as_deref().unwrap_or("-"),
        color_mode = ?params.color_mode,
        width = pixels.width(),
        height = pixels.height(),
        "Process request received"
    );

    let response = workers
        .submit(Request::ProcessImage {
            pixels,
            algorithm,
            params,
            adjustments,
        })
        .await?;

    let (pixels, warnings) = expect_image(response)?;
    image_response(pixels, warnings).await
}
