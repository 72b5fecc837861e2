//! Tiled stamp patterns.

use std::f32::consts::TAU;

use super::{dither_with_map, Dither, DitherOptions, Plane, ThresholdMap};
use crate::palette::Levels;
use crate::params::PatternType;

/// A tileable stamp of side `size`. Low entries turn on first as the image
/// darkens, so the stamp shape grows out of them.
#[derive(Debug, Clone, Copy)]
pub struct PatternStamp {
    kind: PatternType,
    size: usize,
}

impl PatternStamp {
    pub fn new(kind: PatternType, size: usize) -> Self {
        Self {
            kind,
            size: size.max(1),
        }
    }

    /// Offset of the pixel centre from its tile centre, in tile units (-0.5..0.5).
    fn centred(&self, x: usize, y: usize) -> (f32, f32) {
        let s = self.size as f32;
        (
            ((x % self.size) as f32 + 0.5) / s - 0.5,
            ((y % self.size) as f32 + 0.5) / s - 0.5,
        )
    }

    fn brick(&self, x: usize, y: usize) -> f32 {
        let width = self.size.max(2);
        let course = (self.size / 2).max(2);
        let row = y / course;
        let offset = if row % 2 == 1 { width / 2 } else { 0 };
        let lx = (x + offset) % width;
        let ly = y % course;
        let edge = lx.min(width - 1 - lx).min(ly).min(course - 1 - ly) as f32;
        let reach = (course as f32 / 2.0).max(1.0);
        // mortar joints carry the highest thresholds
        (1.0 - edge / reach).clamp(0.0, 1.0)
    }
}

impl ThresholdMap for PatternStamp {
    fn threshold(&self, x: usize, y: usize) -> f32 {
        match self.kind {
            PatternType::Dots => {
                let (u, v) = self.centred(x, y);
                ((u * u + v * v).sqrt() * 2.0).min(1.0)
            }
            PatternType::Lines => ((y % self.size) as f32 + 0.5) / self.size as f32,
            PatternType::Crosses => {
                let (u, v) = self.centred(x, y);
                u.abs().min(v.abs()) * 2.0
            }
            PatternType::Diamonds => {
                let (u, v) = self.centred(x, y);
                ((u.abs() + v.abs()) * 2.0).min(1.0)
            }
            PatternType::Waves => {
                let phase = ((x + y) % self.size) as f32 / self.size as f32;
                ((phase * TAU).sin() + 1.0) / 2.0
            }
            PatternType::Bricks => self.brick(x, y),
            PatternType::Checker => {
                if (x + y) % 2 == 0 {
                    0.25
                } else {
                    0.75
                }
            }
        }
    }
}

pub struct Pattern;

impl Dither for Pattern {
    fn dither(&self, plane: &Plane, levels: &Levels, options: &DitherOptions) -> Vec<u8> {
        let stamp = PatternStamp::new(options.pattern_type, options.pattern_size);
        dither_with_map(plane, levels, &stamp)
    }
}
