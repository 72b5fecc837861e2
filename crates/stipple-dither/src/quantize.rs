//! Entry points of the quantization library.
//!
//! Splits the input into one [`Plane`] per channel of the requested color
//! mode, quantizes the planes in parallel and reassembles an opaque RGBA
//! buffer whose pixels all come from the mode's palette.

use rayon::prelude::*;

use crate::buffer::{GrayscaleBuffer, PixelBuffer};
use crate::dither::{dither_plane, Algorithm, DitherOptions, Plane, PlaneOutput};
use crate::error::{DitherError, Warning};
use crate::palette::{Levels, Palette};
use crate::params::{AlgorithmParams, ColorMode};

/// Screen angle offsets for the C, M, Y and K planes, relative to `angle`.
/// With the default 45° this gives the classic 15/75/0/45 set.
const CMYK_ANGLE_OFFSETS: [f32; 4] = [-30.0, 30.0, -45.0, 0.0];

/// Quantized image plus any non-fatal warnings raised on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantized {
    pub pixels: PixelBuffer,
    pub warnings: Vec<Warning>,
}

/// Quantize a luminance image. Color modes see it as a neutral gray image.
pub fn quantize(
    gray: &GrayscaleBuffer,
    algorithm: Algorithm,
    params: &AlgorithmParams,
) -> Result<Quantized, DitherError> {
    run(Source::Gray(gray), algorithm, params)
}

/// Quantize a color image; `bw` and `custom` modes use its luminance.
pub fn quantize_pixels(
    pixels: &PixelBuffer,
    algorithm: Algorithm,
    params: &AlgorithmParams,
) -> Result<Quantized, DitherError> {
    run(Source::Color(pixels), algorithm, params)
}

#[derive(Clone, Copy)]
enum Source<'a> {
    Gray(&'a GrayscaleBuffer),
    Color(&'a PixelBuffer),
}

impl Source<'_> {
    fn dimensions(&self) -> (u32, u32) {
        match self {
            Source::Gray(g) => (g.width(), g.height()),
            Source::Color(p) => (p.width(), p.height()),
        }
    }

    fn luminance(&self) -> Plane {
        match self {
            Source::Gray(g) => Plane::from_gray(g),
            Source::Color(p) => Plane::from_gray(&p.to_grayscale()),
        }
    }

    /// Normalized RGB of every pixel.
    fn rgb(&self) -> Vec<[f32; 3]> {
        match self {
            Source::Gray(g) => g
                .data()
                .iter()
                .map(|&v| [v as f32 / 255.0; 3])
                .collect(),
            Source::Color(p) => p
                .data()
                .chunks_exact(4)
                .map(|px| [px[0] as f32 / 255.0, px[1] as f32 / 255.0, px[2] as f32 / 255.0])
                .collect(),
        }
    }

    fn rgb_planes(&self) -> Vec<Plane> {
        let (w, h) = self.dimensions();
        let rgb = self.rgb();
        (0..3)
            .map(|c| Plane::new(w as usize, h as usize, rgb.iter().map(|px| px[c] * 255.0).collect()))
            .collect()
    }

    /// C, M, Y and K planes, each holding the ink-free fraction scaled to
    /// 0..=255 so that dark still means "more ink".
    fn cmyk_planes(&self) -> Vec<Plane> {
        let (w, h) = self.dimensions();
        let rgb = self.rgb();
        let mut planes = vec![Vec::with_capacity(rgb.len()); 4];
        for [r, g, b] in rgb {
            let k = 1.0 - r.max(g).max(b);
            let (c, m, y) = if k >= 1.0 {
                (0.0, 0.0, 0.0)
            } else {
                (
                    (1.0 - r - k) / (1.0 - k),
                    (1.0 - g - k) / (1.0 - k),
                    (1.0 - b - k) / (1.0 - k),
                )
            };
            for (plane, ink) in planes.iter_mut().zip([c, m, y, k]) {
                plane.push((1.0 - ink) * 255.0);
            }
        }
        planes
            .into_iter()
            .map(|values| Plane::new(w as usize, h as usize, values))
            .collect()
    }
}

/// Levels one plane is quantized to.
fn levels_for(algorithm: Algorithm, params: &AlgorithmParams, palette: Option<&Palette>) -> Levels {
    match (palette, algorithm) {
        (Some(palette), _) => palette.levels(),
        (None, Algorithm::MultiTone) => {
            Levels::tone_ramp(params.tone_levels as usize, params.tone_distribution)
        }
        (None, _) => Levels::bilevel(),
    }
}

fn run(
    source: Source<'_>,
    algorithm: Algorithm,
    params: &AlgorithmParams,
) -> Result<Quantized, DitherError> {
    if algorithm == Algorithm::Selective {
        return Err(DitherError::UnsupportedAlgorithm(
            "selective needs regions; use composite_selective".to_string(),
        ));
    }
    params.validate()?;

    let palette = match params.color_mode {
        ColorMode::Custom => Some(Palette::from_hex(&params.custom_colors)?),
        _ => None,
    };
    let levels = levels_for(algorithm, params, palette.as_ref());
    let options = DitherOptions::from(params);

    let mut jobs: Vec<(Plane, DitherOptions)> = match params.color_mode {
        ColorMode::Bw | ColorMode::Custom => vec![(source.luminance(), options)],
        ColorMode::Rgb => source
            .rgb_planes()
            .into_iter()
            .enumerate()
            .map(|(i, plane)| {
                let seed = options.seed.wrapping_add(i as u64);
                (plane, options.clone().seed(seed))
            })
            .collect(),
        ColorMode::Cmyk => source
            .cmyk_planes()
            .into_iter()
            .zip(CMYK_ANGLE_OFFSETS)
            .enumerate()
            .map(|(i, (plane, offset))| {
                let seed = options.seed.wrapping_add(i as u64);
                let angle = options.angle + offset;
                (plane, options.clone().seed(seed).angle(angle))
            })
            .collect(),
    };

    if let Some(factor) = params.contrast_factor() {
        for (plane, _) in &mut jobs {
            plane.remap(|v| (factor * (v - 128.0) + 128.0).clamp(0.0, 255.0));
        }
    }

    let (width, height) = source.dimensions();
    tracing::debug!(
        %algorithm,
        color_mode = ?params.color_mode,
        width,
        height,
        planes = jobs.len(),
        levels = levels.len(),
        "quantizing"
    );

    let outputs = jobs
        .par_iter()
        .map(|(plane, options)| dither_plane(algorithm, plane, &levels, options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut warnings: Vec<Warning> = outputs.iter().filter_map(|o| o.warning).collect();
    warnings.dedup();

    let pixels = assemble(params.color_mode, width, height, &levels, palette.as_ref(), &outputs)?;
    Ok(Quantized { pixels, warnings })
}

fn assemble(
    mode: ColorMode,
    width: u32,
    height: u32,
    levels: &Levels,
    palette: Option<&Palette>,
    outputs: &[PlaneOutput],
) -> Result<PixelBuffer, DitherError> {
    let count = width as usize * height as usize;
    let tone = |plane: usize, i: usize| levels.value(outputs[plane].indices[i]);
    let mut data = Vec::with_capacity(count * 4);

    match mode {
        ColorMode::Bw => {
            for i in 0..count {
                let v = tone(0, i).round() as u8;
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        ColorMode::Custom => {
            let palette = palette.ok_or_else(|| {
                DitherError::InternalFault("custom mode without a palette".to_string())
            })?;
            for &index in &outputs[0].indices {
                data.extend_from_slice(&palette.color(index).to_rgba());
            }
        }
        ColorMode::Rgb => {
            for i in 0..count {
                let [r, g, b] = [0, 1, 2].map(|c| tone(c, i).round() as u8);
                data.extend_from_slice(&[r, g, b, 255]);
            }
        }
        ColorMode::Cmyk => {
            for i in 0..count {
                let key = tone(3, i) / 255.0;
                let [r, g, b] = [0, 1, 2].map(|c| (tone(c, i) * key).round() as u8);
                data.extend_from_slice(&[r, g, b, 255]);
            }
        }
    }

    PixelBuffer::new(width, height, data)
}
