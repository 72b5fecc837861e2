//! Request/response entry point wrapping the whole core.
//!
//! [`handle`] is synchronous; callers that must stay responsive run it on a
//! dedicated thread. Every request yields exactly one [`Response`], and a
//! panic inside the core is reported as [`DitherError::InternalFault`]
//! rather than unwinding into the caller.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use crate::adjust::{adjust, AdjustmentParams};
use crate::buffer::PixelBuffer;
use crate::composite::{composite_layers, LayerSpec};
use crate::detect::{detect_regions, BoundingBox};
use crate::dither::Algorithm;
use crate::error::{DitherError, Warning};
use crate::params::AlgorithmParams;
use crate::quantize::{quantize_pixels, Quantized};

/// One unit of work. The pixel buffer is moved in.
#[derive(Debug, Clone)]
pub enum Request {
    ProcessImage {
        pixels: PixelBuffer,
        algorithm: Algorithm,
        params: AlgorithmParams,
        adjustments: AdjustmentParams,
    },
    DetectRegions {
        pixels: PixelBuffer,
        sensitivity: f32,
        min_size: usize,
    },
    ProcessSelective {
        pixels: PixelBuffer,
        layers: Vec<LayerSpec>,
        default_algorithm: Algorithm,
        default_params: AlgorithmParams,
        adjustments: AdjustmentParams,
    },
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::ProcessImage { .. } => "process_image",
            Request::DetectRegions { .. } => "detect_regions",
            Request::ProcessSelective { .. } => "process_selective",
        }
    }

    fn pixels(&self) -> &PixelBuffer {
        match self {
            Request::ProcessImage { pixels, .. }
            | Request::DetectRegions { pixels, .. }
            | Request::ProcessSelective { pixels, .. } => pixels,
        }
    }
}

/// Answer to a [`Request`]. The result buffer is moved out.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Image {
        pixels: PixelBuffer,
        warnings: Vec<Warning>,
    },
    Regions(Vec<BoundingBox>),
    Failed(DitherError),
}

impl Response {
    pub fn is_failure(&self) -> bool {
        matches!(self, Response::Failed(_))
    }
}

pub fn handle(request: Request) -> Response {
    let kind = request.kind();
    let (width, height) = (request.pixels().width(), request.pixels().height());
    let started = Instant::now();

    let response = guarded(move || run(request));

    tracing::debug!(
        request = kind,
        width,
        height,
        elapsed_ms = started.elapsed().as_millis() as u64,
        failed = response.is_failure(),
        "request handled"
    );
    response
}

fn guarded(work: impl FnOnce() -> Result<Response, DitherError>) -> Response {
    match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(Ok(response)) => response,
        Ok(Err(error)) => Response::Failed(error),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(%message, "panic while processing request");
            Response::Failed(DitherError::InternalFault(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn image(quantized: Quantized) -> Response {
    Response::Image {
        pixels: quantized.pixels,
        warnings: quantized.warnings,
    }
}

fn run(request: Request) -> Result<Response, DitherError> {
    match request {
        Request::ProcessImage {
            pixels,
            algorithm,
            params,
            adjustments,
        } => {
            let adjusted = adjust(pixels, &adjustments)?;
            quantize_pixels(&adjusted, algorithm, &params).map(image)
        }
        Request::DetectRegions {
            pixels,
            sensitivity,
            min_size,
        } => detect_regions(&pixels.to_grayscale(), sensitivity, min_size).map(Response::Regions),
        Request::ProcessSelective {
            pixels,
            layers,
            default_algorithm,
            default_params,
            adjustments,
        } => {
            let adjusted = adjust(pixels, &adjustments)?;
            composite_layers(&adjusted, &layers, default_algorithm, &default_params).map(image)
        }
    }
}
