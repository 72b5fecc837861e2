use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use stipple_dither::Algorithm;

use crate::error::ApiError;
use crate::models::{AppConfig, Preset};

#[derive(Debug, Serialize)]
pub struct PresetList {
    pub presets: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AlgorithmList {
    pub algorithms: Vec<Algorithm>,
}

/// Names of the configured presets, sorted.
pub async fn handle_list_presets(State(config): State<Arc<AppConfig>>) -> Json<PresetList> {
    Json(PresetList {
        presets: config.presets.keys().cloned().collect(),
    })
}

pub async fn handle_get_preset(
    State(config): State<Arc<AppConfig>>,
    Path(name): Path<String>,
) -> Result<Json<Preset>, ApiError> {
    config
        .preset(&name)
        .cloned()
        .map(Json)
        .ok_or(ApiError::UnknownPreset(name))
}

/// Every algorithm tag accepted in requests.
pub async fn handle_list_algorithms() -> Json<AlgorithmList> {
    Json(AlgorithmList {
        algorithms: Algorithm::ALL.to_vec(),
    })
}
