//! Neighbourhood stages: box blur and unsharp mask.

use rayon::prelude::*;

use crate::buffer::PixelBuffer;

/// Separable box blur over the color channels. Windows are clipped at the
/// image edge and averaged over the samples that remain.
pub(super) fn box_blur(pixels: &mut PixelBuffer, radius: u32) {
    let blurred = blurred_copy(pixels, radius as usize);
    pixels.data_mut().copy_from_slice(&blurred);
}

/// Unsharp mask against a radius-1 box blur, scaled by `amount / 100`.
pub(super) fn sharpen(pixels: &mut PixelBuffer, amount: f32) {
    let blurred = blurred_copy(pixels, 1);
    let scale = amount / 100.0;
    pixels
        .data_mut()
        .par_chunks_mut(4)
        .zip(blurred.par_chunks(4))
        .for_each(|(px, soft)| {
            for c in 0..3 {
                let v = px[c] as f32;
                let detail = v - soft[c] as f32;
                px[c] = (v + detail * scale).round().clamp(0.0, 255.0) as u8;
            }
        });
}

fn blurred_copy(pixels: &PixelBuffer, radius: usize) -> Vec<u8> {
    let width = pixels.width() as usize;
    let height = pixels.height() as usize;
    let stride = width * 4;
    let src = pixels.data();

    let mut horizontal = vec![0u8; src.len()];
    horizontal
        .par_chunks_mut(stride)
        .zip(src.par_chunks(stride))
        .for_each(|(out, row)| {
            let mut prefix = vec![[0u32; 3]; width + 1];
            for x in 0..width {
                for c in 0..3 {
                    prefix[x + 1][c] = prefix[x][c] + row[x * 4 + c] as u32;
                }
            }
            for x in 0..width {
                let lo = x.saturating_sub(radius);
                let hi = (x + radius).min(width - 1);
                let count = (hi - lo + 1) as u32;
                for c in 0..3 {
                    let sum = prefix[hi + 1][c] - prefix[lo][c];
                    out[x * 4 + c] = ((sum + count / 2) / count) as u8;
                }
                out[x * 4 + 3] = row[x * 4 + 3];
            }
        });

    // Vertical pass in bands of rows, each band sliding its own running
    // column sums so memory stays at one row per band.
    let mut out = vec![0u8; src.len()];
    out.par_chunks_mut(stride * BAND_ROWS)
        .enumerate()
        .for_each(|(band, rows)| {
            let first = band * BAND_ROWS;
            let mut sums = vec![0u32; stride];
            for y in first.saturating_sub(radius)..=(first + radius).min(height - 1) {
                add_row(&mut sums, &horizontal[y * stride..(y + 1) * stride]);
            }

            for (offset, row) in rows.chunks_exact_mut(stride).enumerate() {
                let y = first + offset;
                let lo = y.saturating_sub(radius);
                let hi = (y + radius).min(height - 1);
                let count = (hi - lo + 1) as u32;
                for (i, value) in row.iter_mut().enumerate() {
                    *value = if i % 4 == 3 {
                        src[y * stride + i]
                    } else {
                        ((sums[i] + count / 2) / count) as u8
                    };
                }

                let entering = y + 1 + radius;
                if entering < height {
                    add_row(&mut sums, &horizontal[entering * stride..(entering + 1) * stride]);
                }
                if y >= radius {
                    let leaving = y - radius;
                    for (sum, &v) in sums
                        .iter_mut()
                        .zip(&horizontal[leaving * stride..(leaving + 1) * stride])
                    {
                        *sum -= v as u32;
                    }
                }
            }
        });
    out
}

const BAND_ROWS: usize = 64;

fn add_row(sums: &mut [u32], row: &[u8]) {
    for (sum, &v) in sums.iter_mut().zip(row) {
        *sum += v as u32;
    }
}
