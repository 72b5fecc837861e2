//! Error taxonomy for the dithering core.
//!
//! Every fallible entry point returns [`DitherError`]. Non-fatal conditions
//! (an iteration cap reached by direct binary search) are reported as a
//! [`Warning`] next to a usable result instead.

use serde::Serialize;
use thiserror::Error;

use crate::palette::PaletteError;

/// Failure of a single processing request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DitherError {
    #[error("Invalid dimensions: {width}x{height} with {actual} bytes (expected {expected})")]
    InvalidDimensions {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid palette: {0}")]
    InvalidPalette(#[from] PaletteError),

    #[error("Invalid region geometry: {0}")]
    InvalidRegionGeometry(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Internal fault: {0}")]
    InternalFault(String),
}

impl DitherError {
    /// True for errors caused by caller-supplied input.
    pub fn is_validation(&self) -> bool {
        !matches!(self, DitherError::InternalFault(_))
    }
}

/// Non-fatal condition attached to a successful result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Warning {
    /// Direct binary search hit its pass limit before a pass without changes.
    ConvergenceExceeded { iterations: usize },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::ConvergenceExceeded { iterations } => {
                write!(f, "convergence-exceeded; iterations={iterations}")
            }
        }
    }
}
