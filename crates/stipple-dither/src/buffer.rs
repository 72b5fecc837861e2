//! Owned pixel storage.
//!
//! [`PixelBuffer`] is the unit that moves between pipeline stages: each stage
//! takes it by value and hands back a buffer of the same dimensions, so the
//! backing `Vec<u8>` is never aliased across stages.

use crate::error::DitherError;

/// Row-major RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Row-major single-channel luminance image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Number of samples expected for the given dimensions and channel count.
fn expected_len(width: u32, height: u32, channels: usize) -> Result<usize, DitherError> {
    let invalid = |actual| DitherError::InvalidDimensions {
        width,
        height,
        expected: 0,
        actual,
    };
    if width == 0 || height == 0 {
        return Err(invalid(0));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(|| invalid(0))
}

fn check_len(width: u32, height: u32, channels: usize, actual: usize) -> Result<(), DitherError> {
    let expected = expected_len(width, height, channels).map_err(|_| {
        DitherError::InvalidDimensions {
            width,
            height,
            expected: 0,
            actual,
        }
    })?;
    if expected != actual {
        return Err(DitherError::InvalidDimensions {
            width,
            height,
            expected,
            actual,
        });
    }
    Ok(())
}

/// ITU-R BT.601 luma, rounded to the nearest integer.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    luminance_f32(r as f32, g as f32, b as f32).round() as u8
}

#[inline]
pub(crate) fn luminance_f32(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

impl PixelBuffer {
    /// Wrap raw RGBA samples, taking ownership of `data`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, DitherError> {
        check_len(width, height, 4, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A buffer with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, DitherError> {
        let len = expected_len(width, height, 4)?;
        let data = rgba.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build from a per-pixel closure.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> [u8; 4],
    ) -> Result<Self, DitherError> {
        let len = expected_len(width, height, 4)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Give up the backing storage without copying it.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn same_dimensions(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn to_grayscale(&self) -> GrayscaleBuffer {
        GrayscaleBuffer::from_pixels(self)
    }
}

impl GrayscaleBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, DitherError> {
        check_len(width, height, 1, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_pixels(pixels: &PixelBuffer) -> Self {
        let data = pixels
            .data
            .chunks_exact(4)
            .map(|px| luminance(px[0], px[1], px[2]))
            .collect();
        Self {
            width: pixels.width,
            height: pixels.height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Expand to opaque RGBA with equal channels.
    pub fn to_pixels(&self) -> PixelBuffer {
        let data = self
            .data
            .iter()
            .flat_map(|&v| [v, v, v, 255])
            .collect();
        PixelBuffer {
            width: self.width,
            height: self.height,
            data,
        }
    }
}
