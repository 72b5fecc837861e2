//! Per-pixel color stages.

use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::params::contrast_factor;

/// Apply a 256-entry table to the R, G and B channels.
fn apply_lut(pixels: &mut PixelBuffer, lut: &[u8; 256]) {
    let stride = pixels.width() as usize * 4;
    pixels.data_mut().par_chunks_mut(stride).for_each(|row| {
        for px in row.chunks_exact_mut(4) {
            for c in &mut px[..3] {
                *c = lut[*c as usize];
            }
        }
    });
}

fn build_lut(f: impl Fn(f32) -> f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = f(i as f32).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Contrast around 128, then an additive brightness offset.
pub(super) fn brightness_contrast(pixels: &mut PixelBuffer, brightness: f32, contrast: f32) {
    let factor = contrast_factor(contrast);
    let offset = brightness * 2.55;
    apply_lut(pixels, &build_lut(|v| factor * (v - 128.0) + 128.0 + offset));
}

/// `255 * (v/255)^(1/gamma)`.
pub(super) fn gamma(pixels: &mut PixelBuffer, gamma: f32) {
    let exponent = 1.0 / gamma;
    apply_lut(pixels, &build_lut(|v| 255.0 * (v / 255.0).powf(exponent)));
}

pub(super) fn invert(pixels: &mut PixelBuffer) {
    apply_lut(pixels, &build_lut(|v| 255.0 - v));
}

pub(super) fn hue_saturation_lightness(
    pixels: &mut PixelBuffer,
    hue: f32,
    saturation: f32,
    lightness: f32,
) {
    let shift = hue / 360.0;
    let sat_factor = 1.0 + saturation / 100.0;
    let light = lightness / 100.0;
    let stride = pixels.width() as usize * 4;

    pixels.data_mut().par_chunks_mut(stride).for_each(|row| {
        for px in row.chunks_exact_mut(4) {
            let (h, s, l) = rgb_to_hsl(
                px[0] as f32 / 255.0,
                px[1] as f32 / 255.0,
                px[2] as f32 / 255.0,
            );
            let h = (h + shift).rem_euclid(1.0);
            let s = (s * sat_factor).clamp(0.0, 1.0);
            let l = if light > 0.0 {
                l + (1.0 - l) * light
            } else {
                l + l * light
            }
            .clamp(0.0, 1.0);

            let (r, g, b) = hsl_to_rgb(h, s, l);
            px[0] = (r * 255.0).round().clamp(0.0, 255.0) as u8;
            px[1] = (g * 255.0).round().clamp(0.0, 255.0) as u8;
            px[2] = (b * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    });
}

/// RGB (0..1) to HSL (each 0..1).
pub(super) fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;
    if d < 1e-6 {
        return (0.0, 0.0, l);
    }

    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        ((g - b) / d).rem_euclid(6.0)
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, l)
}

/// HSL (each 0..1) to RGB (0..1).
pub(super) fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s < 1e-6 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsl_round_trip_primaries() {
        for (r, g, b) in [(1.0, 0.0, 0.0), (0.0, 1.0, 0.0), (0.0, 0.0, 1.0), (0.2, 0.4, 0.6)] {
            let (h, s, l) = rgb_to_hsl(r, g, b);
            let (r2, g2, b2) = hsl_to_rgb(h, s, l);
            assert!((r - r2).abs() < 1e-4 && (g - g2).abs() < 1e-4 && (b - b2).abs() < 1e-4);
        }
    }

    #[test]
    fn test_hue_half_turn_gives_complement() {
        let mut pixels = PixelBuffer::filled(1, 1, [255, 0, 0, 255]).unwrap();
        hue_saturation_lightness(&mut pixels, 180.0, 0.0, 0.0);
        assert_eq!(pixels.pixel(0, 0), [0, 255, 255, 255]);
    }

    #[test]
    fn test_full_desaturation_is_gray() {
        let mut pixels = PixelBuffer::filled(1, 1, [200, 40, 90, 255]).unwrap();
        hue_saturation_lightness(&mut pixels, 0.0, -100.0, 0.0);
        let [r, g, b, _] = pixels.pixel(0, 0);
        assert!(r == g && g == b);
    }

    #[test]
    fn test_lightness_extremes() {
        let mut pixels = PixelBuffer::filled(1, 1, [30, 120, 60, 255]).unwrap();
        hue_saturation_lightness(&mut pixels, 0.0, 0.0, 100.0);
        assert_eq!(pixels.pixel(0, 0), [255, 255, 255, 255]);
        hue_saturation_lightness(&mut pixels, 0.0, 0.0, -100.0);
        assert_eq!(pixels.pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn test_contrast_stretches_from_midpoint() {
        let mut pixels = PixelBuffer::filled(1, 1, [100, 128, 160, 255]).unwrap();
        brightness_contrast(&mut pixels, 0.0, 50.0);
        let [r, g, b, _] = pixels.pixel(0, 0);
        assert!(r < 100);
        assert_eq!(g, 128);
        assert!(b > 160);
    }
}
