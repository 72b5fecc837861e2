//! Region auto-detection.
//!
//! Pixels whose Sobel gradient magnitude exceeds `sensitivity` are treated as
//! edges. The remaining pixels are grouped by 4-connected flood fill, and
//! every group of at least `min_size` pixels yields its bounding box.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buffer::GrayscaleBuffer;
use crate::error::DitherError;

/// Inclusive pixel bounds of a detected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.x2 - self.x1 + 1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1 + 1
    }
}

const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Sobel gradient magnitude per pixel, borders replicated.
pub fn gradient_magnitude(gray: &GrayscaleBuffer) -> Vec<f32> {
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    let data = gray.data();
    let sample = |x: isize, y: isize| {
        let x = x.clamp(0, width as isize - 1) as usize;
        let y = y.clamp(0, height as isize - 1) as usize;
        data[y * width + x] as i32
    };

    let mut magnitude = vec![0.0f32; width * height];
    magnitude
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let (mut gx, mut gy) = (0i32, 0i32);
                for ky in 0..3 {
                    for kx in 0..3 {
                        let v = sample(x as isize + kx as isize - 1, y as isize + ky as isize - 1);
                        gx += v * SOBEL_X[ky][kx];
                        gy += v * SOBEL_Y[ky][kx];
                    }
                }
                *out = ((gx * gx + gy * gy) as f32).sqrt();
            }
        });
    magnitude
}

/// Find candidate regions, in the raster order their first pixel is met.
pub fn detect_regions(
    gray: &GrayscaleBuffer,
    sensitivity: f32,
    min_size: usize,
) -> Result<Vec<BoundingBox>, DitherError> {
    if !sensitivity.is_finite() || sensitivity < 0.0 {
        return Err(DitherError::InvalidParameter {
            name: "sensitivity",
            reason: format!("{sensitivity} must be a finite value >= 0"),
        });
    }

    let width = gray.width() as usize;
    let height = gray.height() as usize;
    // Edges start out visited so the fill never enters them.
    let mut visited: Vec<bool> = gradient_magnitude(gray)
        .into_iter()
        .map(|m| m > sensitivity)
        .collect();
    let edges = visited.iter().filter(|&&e| e).count();

    let mut boxes = Vec::new();
    let mut stack = Vec::new();
    for start in 0..visited.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        stack.push(start);

        let mut count = 0usize;
        let (mut x1, mut y1) = (usize::MAX, usize::MAX);
        let (mut x2, mut y2) = (0usize, 0usize);
        while let Some(i) = stack.pop() {
            let (x, y) = (i % width, i / width);
            count += 1;
            x1 = x1.min(x);
            y1 = y1.min(y);
            x2 = x2.max(x);
            y2 = y2.max(y);

            let mut visit = |n: usize| {
                if !visited[n] {
                    visited[n] = true;
                    stack.push(n);
                }
            };
            if x > 0 {
                visit(i - 1);
            }
            if x + 1 < width {
                visit(i + 1);
            }
            if y > 0 {
                visit(i - width);
            }
            if y + 1 < height {
                visit(i + width);
            }
        }

        if count >= min_size {
            boxes.push(BoundingBox {
                x1: x1 as u32,
                y1: y1 as u32,
                x2: x2 as u32,
                y2: y2 as u32,
            });
        }
    }

    tracing::debug!(
        width,
        height,
        edges,
        regions = boxes.len(),
        "region detection finished"
    );
    Ok(boxes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gray(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> GrayscaleBuffer {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        GrayscaleBuffer::new(width, height, data).unwrap()
    }

    #[test]
    fn test_uniform_is_one_full_box() {
        let image = gray(30, 20, |_, _| 77);
        assert!(gradient_magnitude(&image).iter().all(|&m| m == 0.0));
        let boxes = detect_regions(&image, 10.0, 1).unwrap();
        assert_eq!(
            boxes,
            vec![BoundingBox {
                x1: 0,
                y1: 0,
                x2: 29,
                y2: 19
            }]
        );
    }

    #[test]
    fn test_min_size_above_total_gives_nothing() {
        let image = gray(10, 10, |_, _| 0);
        assert!(detect_regions(&image, 10.0, 101).unwrap().is_empty());
        assert_eq!(detect_regions(&image, 10.0, 100).unwrap().len(), 1);
    }

    #[test]
    fn test_vertical_edge_splits_regions() {
        let image = gray(20, 10, |x, _| if x < 10 { 0 } else { 255 });
        let boxes = detect_regions(&image, 50.0, 1).unwrap();
        // Columns 9 and 10 straddle the step and become edges.
        assert_eq!(
            boxes,
            vec![
                BoundingBox { x1: 0, y1: 0, x2: 8, y2: 9 },
                BoundingBox { x1: 11, y1: 0, x2: 19, y2: 9 },
            ]
        );
        assert_eq!(boxes[0].width(), 9);
        assert_eq!(boxes[1].height(), 10);
    }

    #[test]
    fn test_rejects_negative_sensitivity() {
        let image = gray(2, 2, |_, _| 0);
        assert!(matches!(
            detect_regions(&image, -1.0, 1),
            Err(DitherError::InvalidParameter { name: "sensitivity", .. })
        ));
    }
}
