//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::error::ApiError;
use crate::models::{AppConfig, Preset};
use crate::services::WorkerPool;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub workers: Arc<WorkerPool>,
}

/// Create application state and start the dither workers.
///
/// Must be called from inside a tokio runtime.
pub fn create_app_state(config: AppConfig) -> AppState {
    let workers = Arc::new(WorkerPool::new(config.worker_count()));
    tracing::info!(workers = workers.len(), "Dither workers started");

    AppState {
        config: Arc::new(config),
        workers,
    }
}

/// Build the API router with all endpoints and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.limits.max_body_bytes;

    Router::new()
        .route("/api/process", post(handle_process))
        .route("/api/selective", post(handle_selective))
        .route("/api/detect", post(handle_detect))
        .route("/api/presets", get(handle_list_presets))
        .route("/api/presets/:name", get(handle_get_preset))
        .route("/api/algorithms", get(api::handle_list_algorithms))
        // Health check
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

// Wrapper handlers to extract state components for the underlying API handlers

async fn handle_process(
    State(state): State<AppState>,
    payload: Result<Json<api::ProcessRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    api::handle_process(State(state.config), State(state.workers), payload).await
}

async fn handle_selective(
    State(state): State<AppState>,
    payload: Result<Json<api::SelectiveRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    api::handle_selective(State(state.config), State(state.workers), payload).await
}

async fn handle_detect(
    State(state): State<AppState>,
    payload: Result<Json<api::DetectRequest>, JsonRejection>,
) -> Result<Json<api::DetectResponse>, ApiError> {
    api::handle_detect(State(state.config), State(state.workers), payload).await
}

async fn handle_list_presets(State(state): State<AppState>) -> Json<api::presets::PresetList> {
    api::handle_list_presets(State(state.config)).await
}

async fn handle_get_preset(
    State(state): State<AppState>,
    name: Path<String>,
) -> Result<Json<Preset>, ApiError> {
    api::handle_get_preset(State(state.config), name).await
}
