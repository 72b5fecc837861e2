//! Error types for color parsing and palette validation.

use std::num::ParseIntError;
use thiserror::Error;

/// Failure to parse a hex color string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseColorError {
    #[error("invalid hex color length in {0:?} (expected 3 or 6 digits)")]
    InvalidLength(String),

    #[error("invalid hex digit in {input:?}: {source}")]
    InvalidHex {
        input: String,
        #[source]
        source: ParseIntError,
    },
}

/// Custom palette rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaletteError {
    #[error("custom palette needs at least 2 colors, got {count}")]
    TooFewColors { count: usize },

    #[error("custom palette allows at most {max} colors, got {count}")]
    TooManyColors { count: usize, max: usize },

    #[error("color {index}: {source}")]
    ParseColor {
        index: usize,
        #[source]
        source: ParseColorError,
    },
}
