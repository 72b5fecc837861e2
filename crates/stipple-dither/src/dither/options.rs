//! Per-plane settings derived from [`AlgorithmParams`].

use crate::params::{AlgorithmParams, MultiToneAlgorithm, PatternType};

/// Settings one quantizer run needs, already validated and converted to the
/// units the algorithms use.
#[derive(Debug, Clone)]
pub struct DitherOptions {
    /// Alternate scan direction on odd rows (error diffusion only).
    pub serpentine: bool,
    /// Decision point inside a level band, 0..=255.
    pub threshold: f32,
    pub dot_size: usize,
    pub spacing: f32,
    /// Degrees.
    pub angle: f32,
    pub pattern_type: PatternType,
    pub pattern_size: usize,
    pub multi_tone_algorithm: MultiToneAlgorithm,
    pub seed: u64,
    pub max_iterations: usize,
}

impl Default for DitherOptions {
    fn default() -> Self {
        Self::from(&AlgorithmParams::default())
    }
}

impl From<&AlgorithmParams> for DitherOptions {
    fn from(params: &AlgorithmParams) -> Self {
        Self {
            serpentine: false,
            threshold: params.threshold,
            dot_size: params.dot_size.max(1) as usize,
            spacing: params.spacing.max(0.0),
            angle: params.angle,
            pattern_type: params.pattern_type,
            pattern_size: params.pattern_size.max(1) as usize,
            multi_tone_algorithm: params.multi_tone_algorithm,
            seed: params.seed,
            max_iterations: params.dbs_max_iterations.max(1) as usize,
        }
    }
}

impl DitherOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn serpentine(mut self, enabled: bool) -> Self {
        self.serpentine = enabled;
        self
    }

    #[inline]
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    #[inline]
    pub fn angle(mut self, degrees: f32) -> Self {
        self.angle = degrees;
        self
    }

    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[inline]
    pub fn max_iterations(mut self, passes: usize) -> Self {
        self.max_iterations = passes.max(1);
        self
    }
}
