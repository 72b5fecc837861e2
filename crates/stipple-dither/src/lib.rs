// Threshold and kernel tables index by position on purpose.
#![allow(clippy::needless_range_loop, clippy::manual_range_contains)]

//! stipple-dither: dithering, halftoning and selective compositing
//!
//! The crate turns a full-color RGBA image into a reduced-palette rendition
//! with one of sixteen algorithms, optionally using different algorithms in
//! different regions of the same image with feathered blending between them.
//! Everything here is synchronous and holds no state between calls.
//!
//! # Quick Start
//!
//! ```
//! use stipple_dither::{quantize_pixels, Algorithm, AlgorithmParams, PixelBuffer};
//!
//! let pixels = PixelBuffer::filled(8, 8, [128, 128, 128, 255]).unwrap();
//! let result = quantize_pixels(&pixels, Algorithm::FloydSteinberg, &AlgorithmParams::default())
//!     .unwrap();
//!
//! assert_eq!(result.pixels.width(), 8);
//! assert!(result.pixels.data().iter().all(|&v| v == 0 || v == 255));
//! ```
//!
//! # Pipeline
//!
//! ```text
//! PixelBuffer
//!     |
//!     v
//! adjust()                 (brightness/contrast, HSL, gamma, sharpen, blur, invert)
//!     |
//!     +---> quantize_pixels()        single algorithm over the whole image
//!     |
//!     +---> composite_selective()    one layer per MaskRegion, blended in order
//!     |
//!     v
//! Quantized { pixels, warnings }
//! ```
//!
//! [`dispatch::handle`] wraps the whole pipeline in a request/response call
//! that never panics across its boundary.
//!
//! # Planes and Levels
//!
//! Quantizers work on a [`Plane`] of `f32` values in 0..=255 and pick, per
//! pixel, an index into a sorted list of [`Levels`]. A value first finds the
//! band between the two levels around it; the algorithm then only decides
//! between the lower and the upper level of that band:
//!
//! - threshold maps (ordered, halftone, pattern, void-and-cluster, blue noise,
//!   multi-tone) choose the upper level when the value's position in the band,
//!   scaled to 0..=255, exceeds `t * 254 + 0.5` for the map entry `t`;
//! - error diffusion, Riemersma and direct binary search compare the position
//!   against the `threshold` parameter and carry the difference forward.
//!
//! Exact level values therefore pass through every algorithm unchanged, so
//! pure black and pure white never pick up noise.
//!
//! # Color Modes
//!
//! | Mode | Planes | Levels |
//! |------|--------|--------|
//! | `bw` | luminance | 0 and 255 |
//! | `custom` | luminance | palette colors sorted by luminance |
//! | `rgb` | R, G, B | 0 and 255 per channel |
//! | `cmyk` | C, M, Y, K ink-free fractions | 0 and 255 per plane, screens rotated per ink |
//!
//! `multiTone` replaces the bilevel levels with a tone ramp, so it is the one
//! algorithm that emits intermediate grays in `bw` mode.

pub mod adjust;
pub mod buffer;
pub mod composite;
pub mod detect;
pub mod dispatch;
pub mod dither;
pub mod error;
pub mod mask;
pub mod palette;
pub mod params;
pub mod quantize;


pub use adjust::{adjust, AdjustmentParams};
pub use buffer::{luminance, GrayscaleBuffer, PixelBuffer};
pub use composite::{composite_layers, composite_selective, LayerSpec};
pub use detect::{detect_regions, BoundingBox};
pub use dispatch::{handle, Request, Response};
pub use dither::{Algorithm, DitherOptions, Plane};
pub use error::{DitherError, Warning};
pub use mask::{rasterize, Geometry, MaskRegion, RasterMask, RegionList};
pub use palette::{Levels, Palette, PaletteError, ParseColorError, Rgb};
pub use params::{AlgorithmParams, ColorMode, MultiToneAlgorithm, PatternType, ToneDistribution};
pub use quantize::{quantize, quantize_pixels, Quantized};
