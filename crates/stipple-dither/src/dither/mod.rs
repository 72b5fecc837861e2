//! Quantization algorithm library.
//!
//! Every algorithm quantizes one [`Plane`] of channel values (0.0..=255.0)
//! to indices into a [`Levels`] table. Color modes are built on top of this
//! by running one plane per channel (see [`crate::quantize`]).
//!
//! # Families
//!
//! - **Threshold maps**: [`Ordered`], [`Halftone`], [`Pattern`],
//!   [`RandomDither`], [`VoidAndCluster`] and [`BlueNoise`] compare each
//!   value against a [`ThresholdMap`]. Pixels are independent, so rows are
//!   processed in parallel.
//! - **Error diffusion**: [`FloydSteinberg`], [`Atkinson`],
//!   [`JarvisJudiceNinke`], [`Stucki`], [`Burkes`] and [`SierraLite`] share
//!   [`dither_with_kernel`]. A pass is strictly sequential.
//! - **Path and search based**: [`Riemersma`] walks a Hilbert curve,
//!   [`DirectBinarySearch`] refines an initial halftone.
//! - [`MultiTone`] screens between many levels with one of the above.

mod blue_noise;
mod dbs;
mod diffusion;
mod halftone;
mod kernel;
mod multi_tone;
mod options;
mod ordered;
mod pattern;
mod random;
mod riemersma;
mod void_and_cluster;

pub use blue_noise::{blue_noise_array, BlueNoise, BLUE_NOISE_SIZE};
pub use dbs::{DirectBinarySearch, SearchOutcome};
pub use diffusion::{Atkinson, Burkes, FloydSteinberg, JarvisJudiceNinke, SierraLite, Stucki};
pub use halftone::{Halftone, HalftoneScreen};
pub use kernel::*;
pub use multi_tone::MultiTone;
pub use options::DitherOptions;
pub use ordered::{bayer_matrix, BayerMap, Ordered};
pub use pattern::{Pattern, PatternStamp};
pub use random::{dither_with_rng, RandomDither};
pub use riemersma::{hilbert_path, hilbert_walk, Riemersma};
pub use void_and_cluster::{void_and_cluster_array, VoidAndCluster, VOID_AND_CLUSTER_SIZE};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::buffer::GrayscaleBuffer;
use crate::error::{DitherError, Warning};
use crate::palette::Levels;

/// Interchangeable quantization strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    Ordered,
    FloydSteinberg,
    Atkinson,
    #[default]
    Halftone,
    JarvisJudiceNinke,
    Stucki,
    Burkes,
    SierraLite,
    Random,
    VoidAndCluster,
    BlueNoise,
    Riemersma,
    DirectBinarySearch,
    Pattern,
    MultiTone,
    /// Meta-algorithm: per-region compositing, see [`crate::composite`].
    Selective,
}

impl Algorithm {
    pub const ALL: [Algorithm; 16] = [
        Algorithm::Ordered,
        Algorithm::FloydSteinberg,
        Algorithm::Atkinson,
        Algorithm::Halftone,
        Algorithm::JarvisJudiceNinke,
        Algorithm::Stucki,
        Algorithm::Burkes,
        Algorithm::SierraLite,
        Algorithm::Random,
        Algorithm::VoidAndCluster,
        Algorithm::BlueNoise,
        Algorithm::Riemersma,
        Algorithm::DirectBinarySearch,
        Algorithm::Pattern,
        Algorithm::MultiTone,
        Algorithm::Selective,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Algorithm::Ordered => "ordered",
            Algorithm::FloydSteinberg => "floydSteinberg",
            Algorithm::Atkinson => "atkinson",
            Algorithm::Halftone => "halftone",
            Algorithm::JarvisJudiceNinke => "jarvisJudiceNinke",
            Algorithm::Stucki => "stucki",
            Algorithm::Burkes => "burkes",
            Algorithm::SierraLite => "sierraLite",
            Algorithm::Random => "random",
            Algorithm::VoidAndCluster => "voidAndCluster",
            Algorithm::BlueNoise => "blueNoise",
            Algorithm::Riemersma => "riemersma",
            Algorithm::DirectBinarySearch => "directBinarySearch",
            Algorithm::Pattern => "pattern",
            Algorithm::MultiTone => "multiTone",
            Algorithm::Selective => "selective",
        }
    }

    pub fn is_error_diffusion(&self) -> bool {
        matches!(
            self,
            Algorithm::FloydSteinberg
                | Algorithm::Atkinson
                | Algorithm::JarvisJudiceNinke
                | Algorithm::Stucki
                | Algorithm::Burkes
                | Algorithm::SierraLite
        )
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Algorithm {
    type Err = DitherError;

    /// Case-insensitive match on the camelCase tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Algorithm::ALL
            .into_iter()
            .find(|a| a.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| DitherError::UnsupportedAlgorithm(s.to_string()))
    }
}

impl TryFrom<String> for Algorithm {
    type Error = DitherError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Algorithm> for String {
    fn from(algorithm: Algorithm) -> Self {
        algorithm.tag().to_string()
    }
}

/// One channel of working values, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl Plane {
    pub fn new(width: usize, height: usize, values: Vec<f32>) -> Self {
        debug_assert_eq!(values.len(), width * height);
        Self {
            width,
            height,
            values,
        }
    }

    pub fn from_gray(gray: &GrayscaleBuffer) -> Self {
        Self::new(
            gray.width() as usize,
            gray.height() as usize,
            gray.data().iter().map(|&v| v as f32).collect(),
        )
    }

    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self::new(width, height, vec![value; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }

    /// Apply `f` to every value in place.
    pub fn remap(&mut self, f: impl Fn(f32) -> f32 + Sync) {
        self.values.par_iter_mut().for_each(|v| *v = f(*v));
    }
}

/// A quantization strategy over one plane.
///
/// Returns one [`Levels`] index per pixel, row-major.
pub trait Dither {
    fn dither(&self, plane: &Plane, levels: &Levels, options: &DitherOptions) -> Vec<u8>;
}

/// Tileable per-pixel thresholds, normalized to 0..=1.
///
/// A negative entry always selects the upper level (used for the gaps
/// between halftone dots).
pub trait ThresholdMap: Sync {
    fn threshold(&self, x: usize, y: usize) -> f32;
}

/// Compare every value against its map entry. Rows run in parallel.
pub fn dither_with_map<M: ThresholdMap + ?Sized>(
    plane: &Plane,
    levels: &Levels,
    map: &M,
) -> Vec<u8> {
    let width = plane.width;
    let mut output = vec![0u8; plane.values.len()];
    output
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                *out = levels.pick_with_map(plane.get(x, y), map.threshold(x, y));
            }
        });
    output
}

/// Sliding window of pending error rows for error diffusion.
///
/// Row 0 is the row being quantized; rows beyond it collect error for the
/// rows below. Only `max_dy + 1` rows are alive at a time.
#[derive(Debug)]
pub struct ErrorBuffer {
    rows: Vec<Vec<f32>>,
    width: usize,
}

impl ErrorBuffer {
    pub fn new(width: usize, row_depth: usize) -> Self {
        Self {
            rows: (0..row_depth).map(|_| vec![0.0; width]).collect(),
            width,
        }
    }

    #[inline]
    pub fn get_accumulated(&self, x: usize) -> f32 {
        self.rows[0][x]
    }

    /// Out-of-range targets are dropped, never wrapped.
    #[inline]
    pub fn add_error(&mut self, x: usize, row_offset: usize, error: f32) {
        if x < self.width && row_offset < self.rows.len() {
            self.rows[row_offset][x] += error;
        }
    }

    pub fn advance_row(&mut self) {
        self.rows.rotate_left(1);
        if let Some(last) = self.rows.last_mut() {
            last.fill(0.0);
        }
    }
}

/// Shared error-diffusion loop.
///
/// Each pixel picks a level with the decision threshold, then pushes
/// `value - level` to its unvisited neighbours through `kernel`.
pub fn dither_with_kernel(
    plane: &Plane,
    levels: &Levels,
    kernel: &Kernel,
    options: &DitherOptions,
) -> Vec<u8> {
    let (width, height) = (plane.width, plane.height);
    let mut output = vec![0u8; width * height];
    let mut error_buf = ErrorBuffer::new(width, kernel.max_dy + 1);
    let divisor = kernel.divisor as f32;

    for y in 0..height {
        let reverse = options.serpentine && y % 2 == 1;
        let x_range: Box<dyn Iterator<Item = usize>> = if reverse {
            Box::new((0..width).rev())
        } else {
            Box::new(0..width)
        };

        for x in x_range {
            let idx = y * width + x;
            let value = plane.values[idx] + error_buf.get_accumulated(x);
            let level = levels.pick_with_threshold(value, options.threshold);
            output[idx] = level;

            let error = value - levels.value(level);
            if error == 0.0 {
                continue;
            }
            for &(dx, dy, weight) in kernel.entries {
                let dx = if reverse { -dx } else { dx };
                let nx = x as i32 + dx;
                if nx < 0 {
                    continue;
                }
                error_buf.add_error(nx as usize, dy as usize, error * weight as f32 / divisor);
            }
        }

        error_buf.advance_row();
    }

    output
}

/// Result of quantizing one plane.
#[derive(Debug)]
pub(crate) struct PlaneOutput {
    pub indices: Vec<u8>,
    pub warning: Option<Warning>,
}

/// Run `algorithm` over one plane.
pub(crate) fn dither_plane(
    algorithm: Algorithm,
    plane: &Plane,
    levels: &Levels,
    options: &DitherOptions,
) -> Result<PlaneOutput, DitherError> {
    let indices = match algorithm {
        Algorithm::Ordered => Ordered.dither(plane, levels, options),
        Algorithm::FloydSteinberg => FloydSteinberg.dither(plane, levels, options),
        Algorithm::Atkinson => Atkinson.dither(plane, levels, options),
        Algorithm::Halftone => Halftone.dither(plane, levels, options),
        Algorithm::JarvisJudiceNinke => JarvisJudiceNinke.dither(plane, levels, options),
        Algorithm::Stucki => Stucki.dither(plane, levels, options),
        Algorithm::Burkes => Burkes.dither(plane, levels, options),
        Algorithm::SierraLite => SierraLite.dither(plane, levels, options),
        Algorithm::Random => RandomDither.dither(plane, levels, options),
        Algorithm::VoidAndCluster => VoidAndCluster.dither(plane, levels, options),
        Algorithm::BlueNoise => BlueNoise.dither(plane, levels, options),
        Algorithm::Riemersma => Riemersma.dither(plane, levels, options),
        Algorithm::Pattern => Pattern.dither(plane, levels, options),
        Algorithm::MultiTone => MultiTone.dither(plane, levels, options),
        Algorithm::DirectBinarySearch => {
            let outcome = DirectBinarySearch.search(plane, levels, options);
            let warning = (!outcome.converged).then_some(Warning::ConvergenceExceeded {
                iterations: outcome.iterations,
            });
            return Ok(PlaneOutput {
                indices: outcome.indices,
                warning,
            });
        }
        Algorithm::Selective => {
            return Err(DitherError::UnsupportedAlgorithm(
                "selective cannot quantize without regions".to_string(),
            ))
        }
    };
    Ok(PlaneOutput {
        indices,
        warning: None,
    })
}
