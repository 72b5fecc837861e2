//! Blue-noise thresholds from best-candidate sampling.
//!
//! Pixels are inserted one at a time; each insertion draws a handful of
//! random candidates and keeps the one farthest (toroidally) from every
//! pixel already placed. Insertion order becomes the rank, so early ranks
//! are evenly spread and every threshold level is a blue-noise point set.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::void_and_cluster::DitherArray;
use super::{dither_with_map, Dither, DitherOptions, Plane};
use crate::palette::Levels;

pub const BLUE_NOISE_SIZE: usize = 64;

const CANDIDATES: usize = 10;

fn toroidal_distance_sq(a: usize, b: usize, size: usize) -> u32 {
    let (ax, ay) = (a % size, a / size);
    let (bx, by) = (b % size, b / size);
    let dx = ax.abs_diff(bx);
    let dy = ay.abs_diff(by);
    let dx = dx.min(size - dx) as u32;
    let dy = dy.min(size - dy) as u32;
    dx * dx + dy * dy
}

/// Generate a blue-noise rank array of side `size` from `seed`.
pub fn blue_noise_array(size: usize, seed: u64) -> DitherArray {
    let size = size.max(2);
    let cells = size * size;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut remaining: Vec<usize> = (0..cells).collect();
    let mut nearest = vec![u32::MAX; cells];
    let mut ranks = vec![0u32; cells];

    for rank in 0..cells {
        let mut best_slot = rng.gen_range(0..remaining.len());
        for _ in 1..CANDIDATES.min(remaining.len()) {
            let slot = rng.gen_range(0..remaining.len());
            if nearest[remaining[slot]] > nearest[remaining[best_slot]] {
                best_slot = slot;
            }
        }
        let chosen = remaining.swap_remove(best_slot);
        ranks[chosen] = rank as u32;
        for &other in &remaining {
            let d = toroidal_distance_sq(chosen, other, size);
            if d < nearest[other] {
                nearest[other] = d;
            }
        }
    }

    DitherArray::from_ranks(size, &ranks)
}

/// Thresholds against a seeded 64x64 best-candidate array.
pub struct BlueNoise;

impl Dither for BlueNoise {
    fn dither(&self, plane: &Plane, levels: &Levels, options: &DitherOptions) -> Vec<u8> {
        let array = blue_noise_array(BLUE_NOISE_SIZE, options.seed);
        dither_with_map(plane, levels, &array)
    }
}
