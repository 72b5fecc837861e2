//! Output levels a single channel is quantized to.
//!
//! Every quantizer works on one channel at a time and emits an index into a
//! [`Levels`] table. Bilevel output is the two-entry table `[0, 255]`; custom
//! palettes contribute their luminances and multi-tone contributes a ramp.

use crate::params::ToneDistribution;

/// Ascending channel values (0.0..=255.0), at least two entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Levels {
    values: Vec<f32>,
}

impl Levels {
    pub fn bilevel() -> Self {
        Self {
            values: vec![0.0, 255.0],
        }
    }

    /// Sorted copy of `values`. Fewer than two entries falls back to bilevel.
    pub fn new(mut values: Vec<f32>) -> Self {
        if values.len() < 2 {
            return Self::bilevel();
        }
        values.sort_by(f32::total_cmp);
        Self { values }
    }

    /// `count` tones between black and white spaced by `distribution`.
    pub fn tone_ramp(count: usize, distribution: ToneDistribution) -> Self {
        let count = count.clamp(2, 256);
        let values = (0..count)
            .map(|i| {
                let s = i as f32 / (count - 1) as f32;
                let shaped = match distribution {
                    ToneDistribution::Linear => s,
                    ToneDistribution::Logarithmic => (1.0 + 9.0 * s).log10(),
                    ToneDistribution::Exponential => (10f32.powf(s) - 1.0) / 9.0,
                };
                (shaped * 255.0).clamp(0.0, 255.0)
            })
            .collect();
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn value(&self, index: u8) -> f32 {
        self.values[index as usize]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Lower level of the band holding `value` and the position inside that
    /// band scaled to 0..=255.
    #[inline]
    fn band(&self, value: f32) -> (usize, f32) {
        let last = self.values.len() - 1;
        if value <= self.values[0] {
            return (0, 0.0);
        }
        if value >= self.values[last] {
            return (last - 1, 255.0);
        }
        // value < values[last], so a strictly greater entry exists past index 0
        let upper = self
            .values
            .iter()
            .position(|&v| v > value)
            .unwrap_or(last);
        let lo = self.values[upper - 1];
        let hi = self.values[upper];
        (upper - 1, (value - lo) / (hi - lo) * 255.0)
    }

    /// Pick against a normalized threshold-map entry `t`.
    ///
    /// Maps live in 0..=1; the comparison is squeezed into 0.5..254.5 so that
    /// band endpoints always map to themselves. Negative entries force the
    /// upper level.
    #[inline]
    pub fn pick_with_map(&self, value: f32, t: f32) -> u8 {
        let (lower, position) = self.band(value);
        if position > t * 254.0 + 0.5 {
            (lower + 1) as u8
        } else {
            lower as u8
        }
    }

    /// Pick against a fixed decision threshold on the 0..=255 band scale.
    #[inline]
    pub fn pick_with_threshold(&self, value: f32, threshold: f32) -> u8 {
        let (lower, position) = self.band(value);
        if position >= threshold {
            (lower + 1) as u8
        } else {
            lower as u8
        }
    }
}
