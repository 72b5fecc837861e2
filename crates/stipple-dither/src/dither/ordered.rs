//! Ordered dithering with recursive Bayer matrices.

use super::{dither_with_map, Dither, DitherOptions, Plane, ThresholdMap};
use crate::palette::Levels;

/// Bayer index matrix of side `size` (rounded up to a power of two).
///
/// Built by the usual recursion: each entry `v` of the half-size matrix
/// expands to `4v, 4v+2, 4v+3, 4v+1` in its four quadrants.
pub fn bayer_matrix(size: usize) -> Vec<u32> {
    let size = size.max(1).next_power_of_two();
    let mut matrix = vec![0u32];
    let mut n = 1;
    while n < size {
        let mut next = vec![0u32; 4 * n * n];
        for y in 0..n {
            for x in 0..n {
                let v = matrix[y * n + x] * 4;
                next[y * 2 * n + x] = v;
                next[y * 2 * n + x + n] = v + 2;
                next[(y + n) * 2 * n + x] = v + 3;
                next[(y + n) * 2 * n + x + n] = v + 1;
            }
        }
        matrix = next;
        n *= 2;
    }
    matrix
}

/// Bayer thresholds with each cell stretched over `scale` pixels.
#[derive(Debug, Clone)]
pub struct BayerMap {
    size: usize,
    scale: usize,
    thresholds: Vec<f32>,
}

impl BayerMap {
    pub fn new(size: usize, scale: usize) -> Self {
        let matrix = bayer_matrix(size);
        let size = size.max(1).next_power_of_two();
        let cells = (size * size) as f32;
        Self {
            size,
            scale: scale.max(1),
            // centred ranks so a uniform mid-gray lands on exactly half the cells
            thresholds: matrix.iter().map(|&v| (v as f32 + 0.5) / cells).collect(),
        }
    }
}

impl ThresholdMap for BayerMap {
    #[inline]
    fn threshold(&self, x: usize, y: usize) -> f32 {
        let mx = (x / self.scale) % self.size;
        let my = (y / self.scale) % self.size;
        self.thresholds[my * self.size + mx]
    }
}

/// 4x4 Bayer dithering, cells scaled by `dot_size`.
pub struct Ordered;

impl Dither for Ordered {
    fn dither(&self, plane: &Plane, levels: &Levels, options: &DitherOptions) -> Vec<u8> {
        let map = BayerMap::new(4, options.dot_size);
        dither_with_map(plane, levels, &map)
    }
}
