//! Riemersma dithering along a Hilbert curve.

use super::{Dither, DitherOptions, Plane};
use crate::palette::Levels;

/// Length of the error history.
const HISTORY: usize = 16;
/// Weight of the oldest history entry relative to the newest.
const OLDEST_WEIGHT: f32 = 1.0 / 16.0;

/// Visit every pixel once along a generalized Hilbert curve.
///
/// The curve fills the `width` x `height` rectangle directly, so the walk
/// costs one step per pixel whatever the aspect ratio. On power-of-two
/// squares it is the classic Hilbert curve.
pub fn hilbert_walk(width: usize, height: usize, mut visit: impl FnMut(usize, usize)) {
    if width == 0 || height == 0 {
        return;
    }
    let (w, h) = (width as i64, height as i64);
    let mut emit = |x: i64, y: i64| visit(x as usize, y as usize);
    if w >= h {
        gilbert(0, 0, w, 0, 0, h, &mut emit);
    } else {
        gilbert(0, 0, 0, h, w, 0, &mut emit);
    }
}

/// Collected form of [`hilbert_walk`].
pub fn hilbert_path(width: usize, height: usize) -> Vec<(usize, usize)> {
    let mut path = Vec::with_capacity(width * height);
    hilbert_walk(width, height, |x, y| path.push((x, y)));
    path
}

/// Fill the rectangle spanned by major axis `a` and minor axis `b` from
/// corner `(x, y)`. Recursion depth is logarithmic in the longer side.
fn gilbert(x: i64, y: i64, ax: i64, ay: i64, bx: i64, by: i64, emit: &mut impl FnMut(i64, i64)) {
    let w = (ax + ay).abs();
    let h = (bx + by).abs();
    let (dax, day) = (ax.signum(), ay.signum());
    let (dbx, dby) = (bx.signum(), by.signum());

    if h == 1 {
        for i in 0..w {
            emit(x + i * dax, y + i * day);
        }
        return;
    }
    if w == 1 {
        for i in 0..h {
            emit(x + i * dbx, y + i * dby);
        }
        return;
    }

    let (mut ax2, mut ay2) = (ax.div_euclid(2), ay.div_euclid(2));
    let (mut bx2, mut by2) = (bx.div_euclid(2), by.div_euclid(2));
    let w2 = (ax2 + ay2).abs();
    let h2 = (bx2 + by2).abs();

    if 2 * w > 3 * h {
        // Long and thin: split along the major axis only, keeping the
        // halves even so the curve can turn around.
        if w2 % 2 == 1 && w > 2 {
            ax2 += dax;
            ay2 += day;
        }
        gilbert(x, y, ax2, ay2, bx, by, emit);
        gilbert(x + ax2, y + ay2, ax - ax2, ay - ay2, bx, by, emit);
    } else {
        if h2 % 2 == 1 && h > 2 {
            bx2 += dbx;
            by2 += dby;
        }
        gilbert(x, y, bx2, by2, ax2, ay2, emit);
        gilbert(x + bx2, y + by2, ax, ay, bx - bx2, by - by2, emit);
        gilbert(
            x + (ax - dax) + (bx2 - dbx),
            y + (ay - day) + (by2 - dby),
            -bx2,
            -by2,
            -(ax - ax2),
            -(ay - ay2),
            emit,
        );
    }
}

pub struct Riemersma;

impl Dither for Riemersma {
    fn dither(&self, plane: &Plane, levels: &Levels, options: &DitherOptions) -> Vec<u8> {
        let width = plane.width();
        let mut output = vec![0u8; plane.values().len()];

        // Geometric ramp from OLDEST_WEIGHT (index 0) to 1.0 (newest).
        let mut weights = [0f32; HISTORY];
        for (i, w) in weights.iter_mut().enumerate() {
            let age = (HISTORY - 1 - i) as f32 / (HISTORY - 1) as f32;
            *w = OLDEST_WEIGHT.powf(age);
        }
        let mut history = [0f32; HISTORY];

        hilbert_walk(width, plane.height(), |x, y| {
            let original = plane.get(x, y);
            let carried: f32 = history.iter().zip(&weights).map(|(e, w)| e * w).sum();
            let level = levels.pick_with_threshold(original + carried, options.threshold);
            output[y * width + x] = level;

            history.rotate_left(1);
            history[HISTORY - 1] = original - levels.value(level);
        });

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_path_visits_each_pixel_once() {
        for (w, h) in [(1, 1), (5, 3), (8, 8), (13, 7), (7, 13), (1000, 40), (3, 97)] {
            let visited = hilbert_path(w, h);
            let unique: HashSet<_> = visited.iter().copied().collect();
            assert_eq!(visited.len(), w * h, "{w}x{h}");
            assert_eq!(unique.len(), w * h, "{w}x{h}");
        }
    }

    #[test]
    fn test_path_steps_are_adjacent_on_full_square() {
        let path = hilbert_path(16, 16);
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let step = a.0.abs_diff(b.0) + a.1.abs_diff(b.1);
            assert_eq!(step, 1, "{a:?} -> {b:?}");
        }
    }

    #[test]
    fn test_skinny_image_costs_one_step_per_pixel() {
        let mut visits = 0usize;
        let mut last = None;
        hilbert_walk(65_536, 1, |x, y| {
            assert_eq!(y, 0);
            if let Some(prev) = last {
                assert_eq!(x, prev + 1);
            }
            last = Some(x);
            visits += 1;
        });
        assert_eq!(visits, 65_536);

        let mut visits = 0usize;
        hilbert_walk(2, 1_000_000, |_, _| visits += 1);
        assert_eq!(visits, 2_000_000);
    }

    #[test]
    fn test_empty_image_has_no_path() {
        assert!(hilbert_path(0, 5).is_empty());
        assert!(hilbert_path(5, 0).is_empty());
    }

    #[test]
    fn test_skinny_plane_dithers() {
        let plane = Plane::filled(4096, 1, 64.0);
        let out = Riemersma.dither(&plane, &Levels::bilevel(), &DitherOptions::new());
        assert_eq!(out.len(), 4096);
        assert!(out.contains(&0) && out.contains(&1));
    }

    #[test]
    fn test_mid_gray_density() {
        let plane = Plane::filled(64, 64, 128.0);
        let out = Riemersma.dither(&plane, &Levels::bilevel(), &DitherOptions::new());
        let ratio = out.iter().filter(|&&i| i == 1).count() as f64 / out.len() as f64;
        assert!((ratio - 0.5).abs() < 0.1, "got {ratio:.3}");
    }
}
