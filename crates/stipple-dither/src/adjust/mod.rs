//! Pixel adjustment pipeline run before quantization.
//!
//! Stages apply in a fixed order, each one reading the previous stage's
//! output:
//!
//! 1. brightness / contrast
//! 2. hue / saturation / lightness
//! 3. gamma
//! 4. sharpness (unsharp mask)
//! 5. blur
//! 6. invert
//!
//! A stage whose parameter is neutral is skipped entirely, so an all-neutral
//! [`AdjustmentParams`] hands the buffer back untouched.

mod color;
mod filter;

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::DitherError;

/// Photo-style adjustments applied ahead of dithering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentParams {
    /// -100..=100, additive offset of `brightness * 2.55`.
    pub brightness: f32,
    /// -100..=100.
    pub contrast: f32,
    /// -100..=100, -100 fully desaturates.
    pub saturation: f32,
    /// Degrees, -180..=180.
    pub hue: f32,
    /// -100..=100, moves toward white or black.
    pub lightness: f32,
    /// Greater than 0; 1 is neutral.
    pub gamma: f32,
    /// 0..=100.
    pub sharpness: f32,
    /// Box blur radius in pixels.
    pub blur: u32,
    pub invert: bool,
}

impl Default for AdjustmentParams {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.0,
            saturation: 0.0,
            hue: 0.0,
            lightness: 0.0,
            gamma: 1.0,
            sharpness: 0.0,
            blur: 0,
            invert: false,
        }
    }
}

fn check_range(
    name: &'static str,
    value: f32,
    range: std::ops::RangeInclusive<f32>,
) -> Result<(), DitherError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(DitherError::InvalidParameter {
            name,
            reason: format!("{value} is outside {}..={}", range.start(), range.end()),
        })
    }
}

impl AdjustmentParams {
    /// True when [`adjust`] would return its input unchanged.
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), DitherError> {
        check_range("brightness", self.brightness, -100.0..=100.0)?;
        check_range("contrast", self.contrast, -100.0..=100.0)?;
        check_range("saturation", self.saturation, -100.0..=100.0)?;
        check_range("hue", self.hue, -180.0..=180.0)?;
        check_range("lightness", self.lightness, -100.0..=100.0)?;
        check_range("sharpness", self.sharpness, 0.0..=100.0)?;
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(DitherError::InvalidParameter {
                name: "gamma",
                reason: format!("{} must be a finite value > 0", self.gamma),
            });
        }
        Ok(())
    }
}

/// Apply `params` to `pixels`, consuming and returning the same buffer.
///
/// Dimensions and alpha are preserved.
pub fn adjust(mut pixels: PixelBuffer, params: &AdjustmentParams) -> Result<PixelBuffer, DitherError> {
    params.validate()?;
    if params.is_neutral() {
        return Ok(pixels);
    }

    if params.brightness != 0.0 || params.contrast != 0.0 {
        color::brightness_contrast(&mut pixels, params.brightness, params.contrast);
    }
    if params.hue != 0.0 || params.saturation != 0.0 || params.lightness != 0.0 {
        color::hue_saturation_lightness(&mut pixels, params.hue, params.saturation, params.lightness);
    }
    if params.gamma != 1.0 {
        color::gamma(&mut pixels, params.gamma);
    }
    if params.sharpness > 0.0 {
        filter::sharpen(&mut pixels, params.sharpness);
    }
    if params.blur > 0 {
        filter::box_blur(&mut pixels, params.blur);
    }
    if params.invert {
        color::invert(&mut pixels);
    }

    tracing::trace!(
        width = pixels.width(),
        height = pixels.height(),
        "adjustments applied"
    );
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn noisy(width: u32, height: u32) -> PixelBuffer {
        let mut rng = StdRng::seed_from_u64(7);
        PixelBuffer::from_fn(width, height, |_, _| {
            [rng.gen(), rng.gen(), rng.gen(), rng.gen()]
        })
        .unwrap()
    }

    #[test]
    fn test_neutral_is_identity() {
        let input = noisy(17, 9);
        let output = adjust(input.clone(), &AdjustmentParams::default()).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_alpha_and_dimensions_preserved() {
        let input = noisy(12, 5);
        let params = AdjustmentParams {
            brightness: 20.0,
            hue: 90.0,
            gamma: 1.8,
            sharpness: 40.0,
            blur: 2,
            invert: true,
            ..Default::default()
        };
        let output = adjust(input.clone(), &params).unwrap();
        assert_eq!((output.width(), output.height()), (12, 5));
        for (a, b) in input.data().chunks_exact(4).zip(output.data().chunks_exact(4)) {
            assert_eq!(a[3], b[3]);
        }
    }

    #[test]
    fn test_brightness_saturates() {
        let input = PixelBuffer::filled(2, 2, [128, 10, 250, 255]).unwrap();
        let params = AdjustmentParams {
            brightness: 100.0,
            ..Default::default()
        };
        let output = adjust(input, &params).unwrap();
        assert_eq!(output.pixel(0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_gamma_brightens_midtones() {
        let input = PixelBuffer::filled(1, 1, [64, 0, 255, 255]).unwrap();
        let params = AdjustmentParams {
            gamma: 2.0,
            ..Default::default()
        };
        let output = adjust(input, &params).unwrap();
        assert_eq!(output.pixel(0, 0), [128, 0, 255, 255]);
    }

    #[test]
    fn test_invert_runs_last() {
        let input = PixelBuffer::filled(1, 1, [0, 100, 255, 40]).unwrap();
        let params = AdjustmentParams {
            invert: true,
            brightness: -100.0,
            ..Default::default()
        };
        // Brightness first drives everything to 0, inversion then lifts it.
        let output = adjust(input, &params).unwrap();
        assert_eq!(output.pixel(0, 0), [255, 255, 255, 40]);
    }

    #[test]
    fn test_rejects_bad_gamma() {
        for gamma in [0.0, -1.0, f32::NAN] {
            let params = AdjustmentParams {
                gamma,
                ..Default::default()
            };
            let err = adjust(noisy(1, 1), &params).unwrap_err();
            assert!(matches!(err, DitherError::InvalidParameter { name: "gamma", .. }));
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        let params = AdjustmentParams {
            hue: 270.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
