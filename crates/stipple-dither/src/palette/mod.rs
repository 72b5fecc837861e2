//! Colors, custom palettes and quantization levels.

mod color;
mod error;
mod levels;

pub use color::Rgb;
pub use error::{PaletteError, ParseColorError};
pub use levels::Levels;

/// Palette indices are stored as `u8`.
pub const MAX_PALETTE_COLORS: usize = 256;

/// A custom output palette, ordered from darkest to lightest.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn black_and_white() -> Self {
        Self {
            colors: vec![Rgb::BLACK, Rgb::WHITE],
        }
    }

    /// Parse hex colors. Needs two to [`MAX_PALETTE_COLORS`] entries; order
    /// is by luminance afterwards, ties keeping their input order.
    pub fn from_hex<S: AsRef<str>>(colors: &[S]) -> Result<Self, PaletteError> {
        if colors.len() < 2 {
            return Err(PaletteError::TooFewColors {
                count: colors.len(),
            });
        }
        if colors.len() > MAX_PALETTE_COLORS {
            return Err(PaletteError::TooManyColors {
                count: colors.len(),
                max: MAX_PALETTE_COLORS,
            });
        }
        let mut parsed = colors
            .iter()
            .enumerate()
            .map(|(index, s)| {
                s.as_ref()
                    .parse::<Rgb>()
                    .map_err(|source| PaletteError::ParseColor { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        parsed.sort_by(|a, b| a.luminance().total_cmp(&b.luminance()));
        Ok(Self { colors: parsed })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, index: u8) -> Rgb {
        self.colors[index as usize]
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Luminance of every entry, as quantization levels.
    pub fn levels(&self) -> Levels {
        Levels::new(self.colors.iter().map(Rgb::luminance).collect())
    }
}
