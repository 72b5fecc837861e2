//! Rotated dot-screen halftoning.
//!
//! The screen is a grid of cells with pitch `dot_size + spacing`, rotated by
//! `angle`. Inside each cell a dot grows from the centre with darkness and
//! reaches a diameter of `dot_size` on black, so the spacing between dots
//! always stays white.

use super::{dither_with_map, Dither, DitherOptions, Plane, ThresholdMap};
use crate::palette::Levels;

#[derive(Debug, Clone)]
pub struct HalftoneScreen {
    pitch: f32,
    radius: f32,
    cos: f32,
    sin: f32,
}

impl HalftoneScreen {
    pub fn new(dot_size: usize, spacing: f32, angle_degrees: f32) -> Self {
        let dot = dot_size.max(1) as f32;
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        Self {
            pitch: dot + spacing.max(0.0),
            radius: dot / 2.0,
            cos,
            sin,
        }
    }

    /// Distance of a pixel centre from the centre of its screen cell.
    fn distance_to_dot_centre(&self, x: usize, y: usize) -> f32 {
        let px = x as f32 + 0.5;
        let py = y as f32 + 0.5;
        let u = px * self.cos + py * self.sin;
        let v = py * self.cos - px * self.sin;
        let half = self.pitch / 2.0;
        let du = u.rem_euclid(self.pitch) - half;
        let dv = v.rem_euclid(self.pitch) - half;
        (du * du + dv * dv).sqrt()
    }
}

impl ThresholdMap for HalftoneScreen {
    fn threshold(&self, x: usize, y: usize) -> f32 {
        let distance = self.distance_to_dot_centre(x, y);
        if distance >= self.radius {
            -1.0
        } else {
            // dot covers this pixel once darkness exceeds distance / radius
            1.0 - distance / self.radius
        }
    }
}

pub struct Halftone;

impl Dither for Halftone {
    fn dither(&self, plane: &Plane, levels: &Levels, options: &DitherOptions) -> Vec<u8> {
        let screen = HalftoneScreen::new(options.dot_size, options.spacing, options.angle);
        dither_with_map(plane, levels, &screen)
    }
}
