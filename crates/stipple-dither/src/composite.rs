//! Selective compositing: one quantized layer per region, alpha-blended in
//! region order over a base layer quantized with the default algorithm.

use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::dither::Algorithm;
use crate::error::DitherError;
use crate::mask::{rasterize, MaskRegion, RasterMask};
use crate::params::AlgorithmParams;
use crate::quantize::{quantize_pixels, Quantized};

/// A pre-rasterized region ready for compositing.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub mask: RasterMask,
    pub algorithm: Algorithm,
    pub params: AlgorithmParams,
}

/// Rasterize `regions` against `pixels` and composite them.
pub fn composite_selective(
    pixels: &PixelBuffer,
    regions: &[MaskRegion],
    default_algorithm: Algorithm,
    default_params: &AlgorithmParams,
) -> Result<Quantized, DitherError> {
    let layers = regions
        .iter()
        .map(|region| {
            Ok(LayerSpec {
                mask: rasterize(region, pixels.width(), pixels.height())?,
                algorithm: region.algorithm,
                params: region.params.clone(),
            })
        })
        .collect::<Result<Vec<_>, DitherError>>()?;
    composite_layers(pixels, &layers, default_algorithm, default_params)
}

/// Composite already rasterized layers.
///
/// Layers are quantized one at a time and blended straight into the result,
/// so at most one candidate image exists at once. Later layers win where
/// masks overlap.
pub fn composite_layers(
    pixels: &PixelBuffer,
    layers: &[LayerSpec],
    default_algorithm: Algorithm,
    default_params: &AlgorithmParams,
) -> Result<Quantized, DitherError> {
    for layer in layers {
        if layer.mask.width() != pixels.width() || layer.mask.height() != pixels.height() {
            return Err(DitherError::InvalidDimensions {
                width: layer.mask.width(),
                height: layer.mask.height(),
                expected: pixels.pixel_count(),
                actual: layer.mask.weights().len(),
            });
        }
        if layer.algorithm == Algorithm::Selective {
            return Err(DitherError::UnsupportedAlgorithm(layer.algorithm.to_string()));
        }
        layer.params.validate()?;
    }

    let Quantized {
        pixels: mut result,
        mut warnings,
    } = quantize_pixels(pixels, default_algorithm, default_params)?;

    for (index, layer) in layers.iter().enumerate() {
        if layer.mask.weights().iter().all(|&w| w == 0) {
            tracing::debug!(layer = index, algorithm = %layer.algorithm, "skipping empty layer");
            continue;
        }

        let candidate = quantize_pixels(pixels, layer.algorithm, &layer.params)?;
        tracing::debug!(
            layer = index,
            algorithm = %layer.algorithm,
            covered = layer.mask.weights().iter().filter(|&&w| w > 0).count(),
            "compositing layer"
        );
        blend_layer(&mut result, &candidate.pixels, &layer.mask);

        for warning in candidate.warnings {
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
        }
    }

    Ok(Quantized {
        pixels: result,
        warnings,
    })
}

fn blend_layer(result: &mut PixelBuffer, candidate: &PixelBuffer, mask: &RasterMask) {
    let width = result.width() as usize;
    let stride = width * 4;
    result
        .data_mut()
        .par_chunks_mut(stride)
        .zip(candidate.data().par_chunks(stride))
        .zip(mask.weights().par_chunks(width))
        .for_each(|((out, cand), mask)| {
            for ((dst, src), &m) in out.chunks_exact_mut(4).zip(cand.chunks_exact(4)).zip(mask) {
                match m {
                    0 => {}
                    255 => dst.copy_from_slice(src),
                    _ => {
                        for (d, &s) in dst.iter_mut().zip(src) {
                            *d = blend(s, *d, m);
                        }
                    }
                }
            }
        });
}

/// `candidate * m/255 + result * (1 - m/255)`, rounded.
#[inline]
fn blend(candidate: u8, result: u8, m: u8) -> u8 {
    let m = m as u32;
    ((candidate as u32 * m + result as u32 * (255 - m) + 127) / 255) as u8
}
