use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use stipple_dither::DitherError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request body too large: {0}")]
    BodyTooLarge(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Image too large: {pixels} pixels (max {max})")]
    ImageTooLarge { pixels: u64, max: u64 },

    #[error("Image codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("{0}")]
    Dither(#[from] DitherError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("PNG decode error: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("PNG encode error: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("unsupported PNG layout: {0}")]
    Unsupported(String),
}

impl CodecError {
    /// True when the input bytes were at fault rather than the encoder.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, CodecError::Encode(_))
    }
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("dither worker is not running")]
    Closed,

    #[error("dither worker dropped the request")]
    Dropped,

    #[error("worker returned {0} for this request")]
    UnexpectedResponse(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnknownPreset(_) => StatusCode::NOT_FOUND,
            ApiError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Codec(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            ApiError::Codec(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Dither(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Dither(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Worker(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
