//! Direct binary search.
//!
//! Starts from a thresholded halftone and greedily toggles or swaps pixels
//! while that lowers the squared error between the halftone and the target,
//! both seen through a Gaussian model of the eye. The filtered error image
//! is kept up to date incrementally, so every candidate change costs one
//! filter window.

use super::{Dither, DitherOptions, Plane};
use crate::palette::Levels;

const RADIUS: isize = 3;
const SPAN: usize = (2 * RADIUS + 1) as usize;
const SIGMA: f32 = RADIUS as f32 / 2.5;
/// Changes smaller than this are treated as no improvement.
const MIN_GAIN: f32 = 1e-7;

const NEIGHBOURS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Best-effort result of a search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub indices: Vec<u8>,
    /// Passes run, including the final pass without changes.
    pub iterations: usize,
    /// False when the pass limit was reached while changes were still found.
    pub converged: bool,
}

/// Normalized 7x7 Gaussian eye filter.
fn eye_filter() -> [f32; SPAN * SPAN] {
    let mut filter = [0f32; SPAN * SPAN];
    let mut total = 0.0;
    for dy in -RADIUS..=RADIUS {
        for dx in -RADIUS..=RADIUS {
            let w = (-((dx * dx + dy * dy) as f32) / (2.0 * SIGMA * SIGMA)).exp();
            filter[((dy + RADIUS) as usize) * SPAN + (dx + RADIUS) as usize] = w;
            total += w;
        }
    }
    for w in &mut filter {
        *w /= total;
    }
    filter
}

enum Change {
    Toggle { to: u8 },
    Swap { with: usize },
}

struct Search<'a> {
    width: usize,
    height: usize,
    levels: &'a Levels,
    filter: [f32; SPAN * SPAN],
    indices: Vec<u8>,
    /// Eye-filtered (halftone - target), both scaled to 0..1.
    filtered: Vec<f32>,
}

impl<'a> Search<'a> {
    fn new(plane: &Plane, levels: &'a Levels, indices: Vec<u8>) -> Self {
        let (width, height) = (plane.width(), plane.height());
        let mut search = Self {
            width,
            height,
            levels,
            filter: eye_filter(),
            indices,
            filtered: vec![0.0; width * height],
        };
        for i in 0..width * height {
            let target = (plane.values()[i] / 255.0).clamp(0.0, 1.0);
            let diff = search.level(i) - target;
            if diff != 0.0 {
                search.spread(i, diff);
            }
        }
        search
    }

    #[inline]
    fn level(&self, i: usize) -> f32 {
        self.levels.value(self.indices[i]) / 255.0
    }

    /// Visit every in-image pixel of the filter window centred on `centre`.
    #[inline]
    fn window(&self, centre: usize, mut f: impl FnMut(usize, f32)) {
        let (cx, cy) = ((centre % self.width) as isize, (centre / self.width) as isize);
        for dy in -RADIUS..=RADIUS {
            let y = cy + dy;
            if y < 0 || y >= self.height as isize {
                continue;
            }
            for dx in -RADIUS..=RADIUS {
                let x = cx + dx;
                if x < 0 || x >= self.width as isize {
                    continue;
                }
                let w = self.filter[((dy + RADIUS) as usize) * SPAN + (dx + RADIUS) as usize];
                f(y as usize * self.width + x as usize, w);
            }
        }
    }

    /// Add `amount` at `centre` to the filtered error.
    fn spread(&mut self, centre: usize, amount: f32) {
        let mut touched = Vec::with_capacity(SPAN * SPAN);
        self.window(centre, |i, w| touched.push((i, w)));
        for (i, w) in touched {
            self.filtered[i] += amount * w;
        }
    }

    /// Error change from adding `amount` at `centre`.
    fn delta(&self, centre: usize, amount: f32) -> f32 {
        let mut delta = 0.0;
        self.window(centre, |i, w| {
            delta += 2.0 * amount * w * self.filtered[i] + amount * amount * w * w;
        });
        delta
    }

    /// Overlap of the filter windows at `a` and `b`.
    fn overlap(&self, a: usize, b: usize) -> f32 {
        let (bx, by) = ((b % self.width) as isize, (b / self.width) as isize);
        let mut sum = 0.0;
        self.window(a, |i, w| {
            let dx = (i % self.width) as isize - bx;
            let dy = (i / self.width) as isize - by;
            if dx.abs() <= RADIUS && dy.abs() <= RADIUS {
                sum += w * self.filter[((dy + RADIUS) as usize) * SPAN + (dx + RADIUS) as usize];
            }
        });
        sum
    }

    fn neighbour(&self, i: usize, (dx, dy): (isize, isize)) -> Option<usize> {
        let x = (i % self.width) as isize + dx;
        let y = (i / self.width) as isize + dy;
        (x >= 0 && y >= 0 && x < self.width as isize && y < self.height as isize)
            .then(|| y as usize * self.width + x as usize)
    }

    /// Best error-reducing change at pixel `i`, if any.
    fn best_change(&self, i: usize) -> Option<(Change, f32)> {
        let current = self.indices[i];
        let here = self.level(i);
        let mut best: Option<(Change, f32)> = None;
        let mut best_delta = -MIN_GAIN;

        let last = (self.levels.len() - 1) as u8;
        let toggles = [current.checked_sub(1), (current < last).then_some(current + 1)];
        for to in toggles.into_iter().flatten() {
            let amount = self.levels.value(to) / 255.0 - here;
            let delta = self.delta(i, amount);
            if delta < best_delta {
                best_delta = delta;
                best = Some((Change::Toggle { to }, delta));
            }
        }

        for offset in NEIGHBOURS {
            let Some(j) = self.neighbour(i, offset) else {
                continue;
            };
            if self.indices[j] == current {
                continue;
            }
            let amount = self.level(j) - here;
            let delta = self.delta(i, amount) + self.delta(j, -amount)
                - 2.0 * amount * amount * self.overlap(i, j);
            if delta < best_delta {
                best_delta = delta;
                best = Some((Change::Swap { with: j }, delta));
            }
        }

        best
    }

    fn apply(&mut self, i: usize, change: Change) {
        match change {
            Change::Toggle { to } => {
                let amount = self.levels.value(to) / 255.0 - self.level(i);
                self.indices[i] = to;
                self.spread(i, amount);
            }
            Change::Swap { with } => {
                let amount = self.level(with) - self.level(i);
                self.indices.swap(i, with);
                self.spread(i, amount);
                self.spread(with, -amount);
            }
        }
    }

    fn error(&self) -> f32 {
        self.filtered.iter().map(|e| e * e).sum()
    }
}

pub struct DirectBinarySearch;

impl DirectBinarySearch {
    /// Run passes in raster order until one finds nothing to improve or
    /// `options.max_iterations` passes have run.
    pub fn search(&self, plane: &Plane, levels: &Levels, options: &DitherOptions) -> SearchOutcome {
        let initial = plane
            .values()
            .iter()
            .map(|&v| levels.pick_with_threshold(v, options.threshold))
            .collect();
        let mut search = Search::new(plane, levels, initial);
        let start_error = search.error();

        for pass in 1..=options.max_iterations {
            let mut changes = 0usize;
            for i in 0..search.indices.len() {
                if let Some((change, _)) = search.best_change(i) {
                    search.apply(i, change);
                    changes += 1;
                }
            }
            tracing::trace!(pass, changes, "dbs pass");
            if changes == 0 {
                tracing::debug!(
                    passes = pass,
                    start_error,
                    end_error = search.error(),
                    "dbs converged"
                );
                return SearchOutcome {
                    indices: search.indices,
                    iterations: pass,
                    converged: true,
                };
            }
        }

        tracing::warn!(
            passes = options.max_iterations,
            end_error = search.error(),
            "dbs stopped before converging"
        );
        SearchOutcome {
            indices: search.indices,
            iterations: options.max_iterations,
            converged: false,
        }
    }
}

impl Dither for DirectBinarySearch {
    fn dither(&self, plane: &Plane, levels: &Levels, options: &DitherOptions) -> Vec<u8> {
        self.search(plane, levels, options).indices
    }
}
