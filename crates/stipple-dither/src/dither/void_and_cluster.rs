//! Void-and-cluster dither array generation.
//!
//! Builds a `VOID_AND_CLUSTER_SIZE`² rank array with Ulichney's method:
//! a sparse seeded pattern is relaxed until its tightest cluster and largest
//! void coincide, then ranks are assigned by removing clusters (downwards)
//! and filling voids (upwards). Energies use a toroidal Gaussian so the
//! array tiles seamlessly. Ties always resolve to the first pixel in raster
//! order, which keeps the array reproducible for a given seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{dither_with_map, Dither, DitherOptions, Plane, ThresholdMap};
use crate::palette::Levels;

pub const VOID_AND_CLUSTER_SIZE: usize = 32;

const SIGMA: f32 = 1.5;
const KERNEL_RADIUS: isize = 4;

/// Square tileable rank array, thresholds normalized to 0..1.
#[derive(Debug, Clone, PartialEq)]
pub struct DitherArray {
    size: usize,
    thresholds: Vec<f32>,
}

impl DitherArray {
    /// Normalize ranks `0..size²` to centred thresholds.
    pub(crate) fn from_ranks(size: usize, ranks: &[u32]) -> Self {
        let cells = (size * size) as f32;
        Self {
            size,
            thresholds: ranks.iter().map(|&r| (r as f32 + 0.5) / cells).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }
}

impl ThresholdMap for DitherArray {
    #[inline]
    fn threshold(&self, x: usize, y: usize) -> f32 {
        self.thresholds[(y % self.size) * self.size + x % self.size]
    }
}

/// Binary pattern with a running Gaussian energy per pixel.
struct EnergyField {
    size: usize,
    on: Vec<bool>,
    energy: Vec<f32>,
    weights: Vec<(isize, isize, f32)>,
}

impl EnergyField {
    fn new(size: usize) -> Self {
        let mut weights = Vec::new();
        for dy in -KERNEL_RADIUS..=KERNEL_RADIUS {
            for dx in -KERNEL_RADIUS..=KERNEL_RADIUS {
                let d2 = (dx * dx + dy * dy) as f32;
                weights.push((dx, dy, (-d2 / (2.0 * SIGMA * SIGMA)).exp()));
            }
        }
        Self {
            size,
            on: vec![false; size * size],
            energy: vec![0.0; size * size],
            weights,
        }
    }

    fn set(&mut self, index: usize, on: bool) {
        if self.on[index] == on {
            return;
        }
        self.on[index] = on;
        let sign = if on { 1.0 } else { -1.0 };
        let n = self.size as isize;
        let (x, y) = ((index % self.size) as isize, (index / self.size) as isize);
        for &(dx, dy, w) in &self.weights {
            let nx = (x + dx).rem_euclid(n) as usize;
            let ny = (y + dy).rem_euclid(n) as usize;
            self.energy[ny * self.size + nx] += sign * w;
        }
    }

    /// Highest-energy set pixel.
    fn tightest_cluster(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, (&on, &e)) in self.on.iter().zip(&self.energy).enumerate() {
            if on && best.map_or(true, |b| e > self.energy[b]) {
                best = Some(i);
            }
        }
        best
    }

    /// Lowest-energy unset pixel.
    fn largest_void(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, (&on, &e)) in self.on.iter().zip(&self.energy).enumerate() {
            if !on && best.map_or(true, |b| e < self.energy[b]) {
                best = Some(i);
            }
        }
        best
    }
}

/// Generate a void-and-cluster array of side `size` from `seed`.
pub fn void_and_cluster_array(size: usize, seed: u64) -> DitherArray {
    let size = size.max(2);
    let cells = size * size;
    let minority = (cells / 10).max(1);

    let mut field = EnergyField::new(size);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..cells).collect();
    order.shuffle(&mut rng);
    for &i in &order[..minority] {
        field.set(i, true);
    }

    // Relax: move the tightest cluster into the largest void until stable.
    for _ in 0..cells {
        let Some(cluster) = field.tightest_cluster() else {
            break;
        };
        field.set(cluster, false);
        match field.largest_void() {
            Some(void) if void != cluster => field.set(void, true),
            _ => {
                field.set(cluster, true);
                break;
            }
        }
    }

    let prototype_on = field.on.clone();
    let prototype_energy = field.energy.clone();
    let mut ranks = vec![0u32; cells];

    // Phase 1: strip clusters, ranks count down from minority - 1.
    for rank in (0..minority).rev() {
        if let Some(cluster) = field.tightest_cluster() {
            field.set(cluster, false);
            ranks[cluster] = rank as u32;
        }
    }

    // Phase 2: from the prototype, fill voids with the remaining ranks.
    field.on = prototype_on;
    field.energy = prototype_energy;
    for rank in minority..cells {
        if let Some(void) = field.largest_void() {
            field.set(void, true);
            ranks[void] = rank as u32;
        }
    }

    DitherArray::from_ranks(size, &ranks)
}

/// Thresholds against a seeded 32x32 void-and-cluster array.
pub struct VoidAndCluster;

impl Dither for VoidAndCluster {
    fn dither(&self, plane: &Plane, levels: &Levels, options: &DitherOptions) -> Vec<u8> {
        let array = void_and_cluster_array(VOID_AND_CLUSTER_SIZE, options.seed);
        dither_with_map(plane, levels, &array)
    }
}
