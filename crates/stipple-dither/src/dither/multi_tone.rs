//! Screening between more than two output levels.
//!
//! The caller supplies the tone [`Levels`]; each value is screened between
//! the two levels bracketing it with the configured [`MultiToneAlgorithm`].

use super::{
    blue_noise_array, dither_with_kernel, dither_with_map, BayerMap, Dither, DitherOptions, Plane,
    BLUE_NOISE_SIZE, FLOYD_STEINBERG,
};
use crate::palette::Levels;
use crate::params::MultiToneAlgorithm;

/// Bayer side used for a given dot size: a power of two in 2..=16.
fn matrix_size(dot_size: usize) -> usize {
    dot_size.clamp(2, 16).next_power_of_two()
}

pub struct MultiTone;

impl Dither for MultiTone {
    fn dither(&self, plane: &Plane, levels: &Levels, options: &DitherOptions) -> Vec<u8> {
        match options.multi_tone_algorithm {
            MultiToneAlgorithm::Ordered => {
                let map = BayerMap::new(matrix_size(options.dot_size), 1);
                dither_with_map(plane, levels, &map)
            }
            MultiToneAlgorithm::ErrorDiffusion => {
                dither_with_kernel(plane, levels, &FLOYD_STEINBERG, options)
            }
            MultiToneAlgorithm::BlueNoise => {
                let array = blue_noise_array(BLUE_NOISE_SIZE, options.seed);
                dither_with_map(plane, levels, &array)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ToneDistribution;

    #[test]
    fn test_matrix_size() {
        assert_eq!(matrix_size(1), 2);
        assert_eq!(matrix_size(3), 4);
        assert_eq!(matrix_size(5), 8);
        assert_eq!(matrix_size(40), 16);
    }

    #[test]
    fn test_exact_tones_pass_through() {
        let levels = Levels::tone_ramp(5, ToneDistribution::Linear);
        for algorithm in [
            MultiToneAlgorithm::Ordered,
            MultiToneAlgorithm::ErrorDiffusion,
            MultiToneAlgorithm::BlueNoise,
        ] {
            let options = DitherOptions {
                multi_tone_algorithm: algorithm,
                ..DitherOptions::new()
            };
            for (index, &tone) in levels.values().iter().enumerate() {
                let plane = Plane::filled(8, 8, tone);
                let out = MultiTone.dither(&plane, &levels, &options);
                assert!(
                    out.iter().all(|&i| i as usize == index),
                    "{algorithm:?} tone {tone} not reproduced"
                );
            }
        }
    }

    #[test]
    fn test_values_between_tones_mix_neighbours_only() {
        let levels = Levels::tone_ramp(5, ToneDistribution::Linear);
        let plane = Plane::filled(16, 16, 100.0); // between 63.75 and 127.5
        let out = MultiTone.dither(&plane, &levels, &DitherOptions::new());
        assert!(out.iter().all(|&i| i == 1 || i == 2));
        assert!(out.contains(&1) && out.contains(&2));
    }
}
