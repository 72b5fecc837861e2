//! Helpers shared by the image endpoints.

use axum::{
    body::Bytes,
    extract::rejection::JsonRejection,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use stipple_dither::{BoundingBox, PixelBuffer, Response as DispatchResponse, Warning};

use crate::error::{ApiError, WorkerError};
use crate::rendering::{decode_base64_png, encode_png};

/// Set once per warning attached to a processed image.
pub const WARNING_HEADER: HeaderName = HeaderName::from_static("x-stipple-warning");

/// Unwrap a JSON body. Oversized bodies give 413, any other rejection 400.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::BodyTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    })
}

/// Decode a base64 PNG off the async runtime.
pub async fn decode_image(image: String, max_pixels: u64) -> Result<PixelBuffer, ApiError> {
    tokio::task::spawn_blocking(move || decode_base64_png(&image, max_pixels))
        .await
        .map_err(|e| ApiError::Internal(format!("Decode task failed: {e}")))?
}

pub fn expect_image(response: DispatchResponse) -> Result<(PixelBuffer, Vec<Warning>), ApiError> {
    match response {
        DispatchResponse::Image { pixels, warnings } => Ok((pixels, warnings)),
        DispatchResponse::Failed(e) => Err(e.into()),
        DispatchResponse::Regions(_) => Err(WorkerError::UnexpectedResponse("regions").into()),
    }
}

pub fn expect_regions(response: DispatchResponse) -> Result<Vec<BoundingBox>, ApiError> {
    match response {
        DispatchResponse::Regions(regions) => Ok(regions),
        DispatchResponse::Failed(e) => Err(e.into()),
        DispatchResponse::Image { .. } => Err(WorkerError::UnexpectedResponse("an image").into()),
    }
}

/// Encode `pixels` as a PNG response, one warning header per warning.
pub async fn image_response(pixels: PixelBuffer, warnings: Vec<Warning>) -> Result<Response, ApiError> {
    let (width, height) = (pixels.width(), pixels.height());
    let png_bytes = tokio::task::spawn_blocking(move || encode_png(&pixels))
        .await
        .map_err(|e| ApiError::Internal(format!("Encode task failed: {e}")))??;

    tracing::info!(
        width,
        height,
        size_bytes = png_bytes.len(),
        warnings = warnings.len(),
        "Image processed"
    );

    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CONTENT_LENGTH, &png_bytes.len().to_string()),
        ],
        Bytes::from(png_bytes),
    )
        .into_response();

    for warning in &warnings {
        tracing::warn!(%warning, "Returning image with warning");
        if let Ok(value) = HeaderValue::from_str(&warning.to_string()) {
            response.headers_mut().append(WARNING_HEADER, value);
        }
    }

    Ok(response)
}
