//! Test fixtures: PNG payloads built in memory.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::StdRng, Rng, SeedableRng};
use stipple_dither::PixelBuffer;

/// Horizontal black-to-white ramp
pub fn gradient(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, _| {
        let v = (x * 255 / (width - 1).max(1)) as u8;
        [v, v, v, 255]
    })
    .unwrap()
}

/// Uniform gray image
pub fn flat(width: u32, height: u32, value: u8) -> PixelBuffer {
    PixelBuffer::filled(width, height, [value, value, value, 255]).unwrap()
}

/// Black square on light noise, the square spanning `start..end` on both axes
pub fn square_on_noise(size: u32, start: u32, end: u32, seed: u64) -> PixelBuffer {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise: Vec<u8> = (0..size * size).map(|_| rng.gen_range(128..=255)).collect();
    PixelBuffer::from_fn(size, size, |x, y| {
        if (start..end).contains(&x) && (start..end).contains(&y) {
            [0, 0, 0, 255]
        } else {
            let v = noise[(y * size + x) as usize];
            [v, v, v, 255]
        }
    })
    .unwrap()
}

/// Colorful test card
pub fn color_card(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        [
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
            255,
        ]
    })
    .unwrap()
}

pub fn png_bytes(pixels: &PixelBuffer) -> Vec<u8> {
    stipple::rendering::encode_png(pixels).unwrap()
}

/// Base64 PNG as sent in request bodies
pub fn png_base64(pixels: &PixelBuffer) -> String {
    STANDARD.encode(png_bytes(pixels))
}
