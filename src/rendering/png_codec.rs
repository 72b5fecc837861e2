//! PNG decoding into [`PixelBuffer`] and RGBA8 encoding back out.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use stipple_dither::PixelBuffer;

use crate::error::{ApiError, CodecError};

/// Decode PNG bytes to RGBA8.
///
/// Gray, gray-alpha, RGB, RGBA and indexed images are accepted; 16-bit
/// samples are stripped to 8 bits and palettes are expanded. Images with
/// more than `max_pixels` pixels are rejected before their data is read.
pub fn decode_png(bytes: &[u8], max_pixels: u64) -> Result<PixelBuffer, ApiError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info().map_err(CodecError::from)?;

    let (width, height) = {
        let info = reader.info();
        (info.width, info.height)
    };
    let pixels = width as u64 * height as u64;
    if pixels > max_pixels {
        return Err(ApiError::ImageTooLarge {
            pixels,
            max: max_pixels,
        });
    }

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).map_err(CodecError::from)?;
    if frame.bit_depth != png::BitDepth::Eight {
        return Err(CodecError::Unsupported(format!("bit depth {:?}", frame.bit_depth)).into());
    }
    let samples = &buf[..frame.buffer_size()];
    let row_len = frame.line_size;

    let mut rgba = Vec::with_capacity(pixels as usize * 4);
    for row in samples.chunks_exact(row_len) {
        match frame.color_type {
            png::ColorType::Grayscale => {
                for &v in &row[..width as usize] {
                    rgba.extend_from_slice(&[v, v, v, 255]);
                }
            }
            png::ColorType::GrayscaleAlpha => {
                for px in row.chunks_exact(2).take(width as usize) {
                    rgba.extend_from_slice(&[px[0], px[0], px[0], px[1]]);
                }
            }
            png::ColorType::Rgb => {
                for px in row.chunks_exact(3).take(width as usize) {
                    rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
            }
            png::ColorType::Rgba => {
                rgba.extend_from_slice(&row[..width as usize * 4]);
            }
            png::ColorType::Indexed => {
                return Err(CodecError::Unsupported("unexpanded palette".to_string()).into());
            }
        }
    }

    Ok(PixelBuffer::new(width, height, rgba)?)
}

/// Decode a base64 string holding a PNG file. A `data:` URL prefix is
/// tolerated.
pub fn decode_base64_png(payload: &str, max_pixels: u64) -> Result<PixelBuffer, ApiError> {
    let encoded = match payload.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(CodecError::from)?;
    decode_png(&bytes, max_pixels)
}

/// Encode as an RGBA8 PNG.
pub fn encode_png(pixels: &PixelBuffer) -> Result<Vec<u8>, CodecError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, pixels.width(), pixels.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(pixels.data())?;
    }
    Ok(buf.into_inner())
}

/// Base64 form of [`encode_png`].
pub fn encode_base64_png(pixels: &PixelBuffer) -> Result<String, CodecError> {
    encode_png(pixels).map(|bytes| STANDARD.encode(bytes))
}
