use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ParseColorError;
use crate::buffer::luminance_f32;

/// An 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn luminance(&self) -> f32 {
        luminance_f32(self.r as f32, self.g as f32, self.b as f32)
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse `#RRGGBB`, `RRGGBB`, `#RGB` or `RGB` (case-insensitive).
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let s = input.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        let digit = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&s[range], 16).map_err(|source| ParseColorError::InvalidHex {
                input: input.to_string(),
                source,
            })
        };

        if !s.is_ascii() {
            return Err(ParseColorError::InvalidLength(input.to_string()));
        }
        match s.len() {
            // #abc expands each digit: 0xF -> 0xFF
            3 => Ok(Self::new(digit(0..1)? * 17, digit(1..2)? * 17, digit(2..3)? * 17)),
            6 => Ok(Self::new(digit(0..2)?, digit(2..4)?, digit(4..6)?)),
            _ => Err(ParseColorError::InvalidLength(input.to_string())),
        }
    }
}
