//! White-noise thresholding.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Dither, DitherOptions, Plane};
use crate::palette::Levels;

/// Compare each value against its own uniform random threshold, drawn from
/// `rng` in raster order.
pub fn dither_with_rng<R: Rng + ?Sized>(plane: &Plane, levels: &Levels, rng: &mut R) -> Vec<u8> {
    plane
        .values()
        .iter()
        .map(|&value| levels.pick_with_map(value, rng.gen::<f32>()))
        .collect()
}

/// Random dithering seeded from `options.seed`.
pub struct RandomDither;

impl Dither for RandomDither {
    fn dither(&self, plane: &Plane, levels: &Levels, options: &DitherOptions) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(options.seed);
        dither_with_rng(plane, levels, &mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_same_seed_same_output() {
        let plane = Plane::filled(32, 32, 100.0);
        let levels = Levels::bilevel();
        let a = RandomDither.dither(&plane, &levels, &DitherOptions::new().seed(7));
        let b = RandomDither.dither(&plane, &levels, &DitherOptions::new().seed(7));
        let c = RandomDither.dither(&plane, &levels, &DitherOptions::new().seed(8));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_injected_source_drives_decisions() {
        // A constant zero source turns every non-black value white.
        let plane = Plane::new(3, 1, vec![0.0, 1.0, 200.0]);
        let mut rng = StepRng::new(0, 0);
        let out = dither_with_rng(&plane, &Levels::bilevel(), &mut rng);
        assert_eq!(out, vec![0, 1, 1]);
    }

    #[test]
    fn test_density_tracks_value() {
        let plane = Plane::filled(64, 64, 191.25);
        let out = RandomDither.dither(&plane, &Levels::bilevel(), &DitherOptions::new());
        let ratio = out.iter().filter(|&&i| i == 1).count() as f64 / out.len() as f64;
        assert!((ratio - 0.75).abs() < 0.04, "got {ratio:.3}");
    }
}
