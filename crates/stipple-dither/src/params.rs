//! Request-scoped algorithm settings.
//!
//! [`AlgorithmParams`] is a plain value object: the core never keeps it
//! between calls, and hosts persist or share it through serde.

use serde::{Deserialize, Serialize};

use crate::error::DitherError;

/// Output palette family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Luminance quantized to black and white.
    #[default]
    Bw,
    /// Cyan, magenta, yellow and black planes, each bilevel.
    Cmyk,
    /// Red, green and blue channels, each bilevel.
    Rgb,
    /// Luminance mapped onto `custom_colors`.
    Custom,
}

/// Stamp tiled by the pattern algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    #[default]
    Dots,
    Lines,
    Crosses,
    Diamonds,
    Waves,
    Bricks,
    #[serde(alias = "custom")]
    Checker,
}

/// Spacing of multi-tone output levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneDistribution {
    #[default]
    Linear,
    Logarithmic,
    Exponential,
}

/// Screening used between adjacent multi-tone levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MultiToneAlgorithm {
    #[default]
    Ordered,
    ErrorDiffusion,
    BlueNoise,
}

pub const DEFAULT_SEED: u64 = 0x5EED;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmParams {
    /// Dot or cell size in pixels.
    pub dot_size: u32,
    /// 0..=100, 50 leaves values untouched.
    pub contrast: f32,
    pub color_mode: ColorMode,
    /// Gap between halftone dots in pixels.
    pub spacing: f32,
    /// Halftone screen angle in degrees.
    pub angle: f32,
    /// Hex colors used when `color_mode` is custom.
    pub custom_colors: Vec<String>,
    pub pattern_type: PatternType,
    pub pattern_size: u32,
    pub tone_levels: u32,
    pub tone_distribution: ToneDistribution,
    pub multi_tone_algorithm: MultiToneAlgorithm,
    /// Decision threshold for error diffusion, Riemersma and DBS.
    pub threshold: f32,
    /// Seed for random thresholds and generated dither arrays.
    pub seed: u64,
    /// Pass limit for direct binary search.
    pub dbs_max_iterations: u32,
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        Self {
            dot_size: 3,
            contrast: 50.0,
            color_mode: ColorMode::Bw,
            spacing: 5.0,
            angle: 45.0,
            custom_colors: vec!["#000000".to_string(), "#ffffff".to_string()],
            pattern_type: PatternType::Dots,
            pattern_size: 4,
            tone_levels: 4,
            tone_distribution: ToneDistribution::Linear,
            multi_tone_algorithm: MultiToneAlgorithm::Ordered,
            threshold: 128.0,
            seed: DEFAULT_SEED,
            dbs_max_iterations: 15,
        }
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> DitherError {
    DitherError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

impl AlgorithmParams {
    pub fn validate(&self) -> Result<(), DitherError> {
        if self.dot_size == 0 {
            return Err(invalid("dot_size", "must be at least 1"));
        }
        if self.pattern_size == 0 {
            return Err(invalid("pattern_size", "must be at least 1"));
        }
        if !(0.0..=100.0).contains(&self.contrast) {
            return Err(invalid("contrast", format!("{} is outside 0..=100", self.contrast)));
        }
        if !self.spacing.is_finite() || self.spacing < 0.0 {
            return Err(invalid("spacing", "must be a finite value >= 0"));
        }
        if !self.angle.is_finite() {
            return Err(invalid("angle", "must be finite"));
        }
        if !(0.0..=255.0).contains(&self.threshold) {
            return Err(invalid("threshold", format!("{} is outside 0..=255", self.threshold)));
        }
        if self.tone_levels < 2 {
            return Err(invalid("tone_levels", "must be at least 2"));
        }
        if self.dbs_max_iterations == 0 {
            return Err(invalid("dbs_max_iterations", "must be at least 1"));
        }
        Ok(())
    }

    /// Contrast remap factor, `None` when contrast sits at the neutral 50.
    pub fn contrast_factor(&self) -> Option<f32> {
        if self.contrast == 50.0 {
            return None;
        }
        Some(contrast_factor((self.contrast - 50.0) * 255.0 / 50.0))
    }
}

/// Classic `259(C+255) / 255(259-C)` contrast curve for C in -255..=255.
pub(crate) fn contrast_factor(c: f32) -> f32 {
    (259.0 * (c + 255.0)) / (255.0 * (259.0 - c))
}
