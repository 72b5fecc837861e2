//! Region geometry and rasterization to per-pixel weights.
//!
//! Coordinates are normalized to the image: x and y axes scale by width and
//! height, while circle radius and feather bands scale by `min(width, height)`.
//! Pixels are sampled at their centres. Feathering ramps inward from the
//! region edge, so a mask is always 0 outside its shape.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dither::Algorithm;
use crate::error::DitherError;
use crate::params::AlgorithmParams;

/// Largest accepted feather, as a fraction of `min(width, height)`.
pub const MAX_FEATHER: f32 = 0.5;

/// Region shape in normalized coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Circle {
        center_x: f32,
        center_y: f32,
        radius: f32,
    },
    Rectangle { x1: f32, y1: f32, x2: f32, y2: f32 },
    /// Vertices as `[x, y]`, filled with the even-odd rule.
    Polygon { vertices: Vec<[f32; 2]> },
}

/// A region of the image dithered with its own algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskRegion {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub geometry: Geometry,
    /// 0..=0.5, width of the soft edge.
    #[serde(default)]
    pub feather: f32,
    pub algorithm: Algorithm,
    #[serde(default)]
    pub params: AlgorithmParams,
}

impl MaskRegion {
    pub fn new(geometry: Geometry, algorithm: Algorithm) -> Self {
        Self {
            name: String::new(),
            geometry,
            feather: 0.0,
            algorithm,
            params: AlgorithmParams::default(),
        }
    }

    pub fn feather(mut self, feather: f32) -> Self {
        self.feather = feather;
        self
    }

    pub fn params(mut self, params: AlgorithmParams) -> Self {
        self.params = params;
        self
    }

    pub fn validate(&self) -> Result<(), DitherError> {
        if !self.feather.is_finite() || !(0.0..=MAX_FEATHER).contains(&self.feather) {
            return Err(geometry_error(format!(
                "feather {} is outside 0..={MAX_FEATHER}",
                self.feather
            )));
        }
        self.geometry.validate()
    }
}

fn geometry_error(reason: impl Into<String>) -> DitherError {
    DitherError::InvalidRegionGeometry(reason.into())
}

impl Geometry {
    pub fn validate(&self) -> Result<(), DitherError> {
        match self {
            Geometry::Circle {
                center_x,
                center_y,
                radius,
            } => {
                if ![center_x, center_y, radius].iter().all(|v| v.is_finite()) {
                    return Err(geometry_error("circle has non-finite coordinates"));
                }
                if *radius <= 0.0 {
                    return Err(geometry_error(format!("circle radius {radius} must be > 0")));
                }
            }
            Geometry::Rectangle { x1, y1, x2, y2 } => {
                if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
                    return Err(geometry_error("rectangle has non-finite coordinates"));
                }
                if x1 == x2 || y1 == y2 {
                    return Err(geometry_error("rectangle has zero area"));
                }
            }
            Geometry::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return Err(geometry_error(format!(
                        "polygon needs at least 3 vertices, got {}",
                        vertices.len()
                    )));
                }
                if !vertices.iter().flatten().all(|v| v.is_finite()) {
                    return Err(geometry_error("polygon has non-finite coordinates"));
                }
            }
        }
        Ok(())
    }
}

/// Per-pixel weight, 0 excluded through 255 fully included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterMask {
    width: u32,
    height: u32,
    weights: Vec<u8>,
}

impl RasterMask {
    pub fn new(width: u32, height: u32, weights: Vec<u8>) -> Result<Self, DitherError> {
        let expected = width as usize * height as usize;
        if width == 0 || height == 0 || weights.len() != expected {
            return Err(DitherError::InvalidDimensions {
                width,
                height,
                expected,
                actual: weights.len(),
            });
        }
        Ok(Self {
            width,
            height,
            weights,
        })
    }

    /// A mask selecting every pixel.
    pub fn full(width: u32, height: u32) -> Result<Self, DitherError> {
        Self::new(width, height, vec![255; width as usize * height as usize])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn weights(&self) -> &[u8] {
        &self.weights
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.weights[y as usize * self.width as usize + x as usize]
    }
}

/// Geometry converted to pixel space.
enum Shape {
    Circle { cx: f32, cy: f32, radius: f32, inner: f32 },
    Rectangle { min: [f32; 2], max: [f32; 2], band: f32 },
    Polygon { vertices: Vec<[f32; 2]>, band: f32 },
}

impl Shape {
    fn weight(&self, px: f32, py: f32) -> u8 {
        match self {
            Shape::Circle {
                cx,
                cy,
                radius,
                inner,
            } => {
                let d = (px - cx).hypot(py - cy);
                if d > *radius {
                    0
                } else if d <= *inner {
                    255
                } else {
                    ramp(radius - d, radius - inner)
                }
            }
            Shape::Rectangle { min, max, band } => {
                if px < min[0] || px > max[0] || py < min[1] || py > max[1] {
                    return 0;
                }
                let d = (px - min[0])
                    .min(max[0] - px)
                    .min(py - min[1])
                    .min(max[1] - py);
                ramp(d, *band)
            }
            Shape::Polygon { vertices, band } => {
                if !point_in_polygon(px, py, vertices) {
                    return 0;
                }
                if *band <= 0.0 {
                    return 255;
                }
                ramp(distance_to_edges(px, py, vertices), *band)
            }
        }
    }
}

/// Weight at `depth` pixels inside an edge with a ramp `band` pixels wide.
fn ramp(depth: f32, band: f32) -> u8 {
    if band <= 0.0 || depth >= band {
        255
    } else {
        (255.0 * depth / band).round().clamp(0.0, 255.0) as u8
    }
}

fn point_in_polygon(x: f32, y: f32, vertices: &[[f32; 2]]) -> bool {
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let [xi, yi] = vertices[i];
        let [xj, yj] = vertices[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn distance_to_edges(x: f32, y: f32, vertices: &[[f32; 2]]) -> f32 {
    let mut best = f32::INFINITY;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        best = best.min(distance_to_segment([x, y], vertices[j], vertices[i]));
        j = i;
    }
    best
}

fn distance_to_segment(p: [f32; 2], a: [f32; 2], b: [f32; 2]) -> f32 {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p[0] - a[0]) * dx + (p[1] - a[1]) * dy) / len2).clamp(0.0, 1.0)
    };
    (p[0] - (a[0] + t * dx)).hypot(p[1] - (a[1] + t * dy))
}

/// Rasterize `region` into a `width` x `height` weight map.
pub fn rasterize(region: &MaskRegion, width: u32, height: u32) -> Result<RasterMask, DitherError> {
    if width == 0 || height == 0 {
        return Err(DitherError::InvalidDimensions {
            width,
            height,
            expected: 0,
            actual: 0,
        });
    }
    region.validate()?;

    let (w, h) = (width as f32, height as f32);
    let min_dim = w.min(h);
    let band = region.feather * min_dim;
    let shape = match &region.geometry {
        Geometry::Circle {
            center_x,
            center_y,
            radius,
        } => {
            let radius = radius * min_dim;
            Shape::Circle {
                cx: center_x * w,
                cy: center_y * h,
                radius,
                inner: radius * (1.0 - region.feather),
            }
        }
        Geometry::Rectangle { x1, y1, x2, y2 } => Shape::Rectangle {
            min: [x1.min(*x2) * w, y1.min(*y2) * h],
            max: [x1.max(*x2) * w, y1.max(*y2) * h],
            band,
        },
        Geometry::Polygon { vertices } => Shape::Polygon {
            vertices: vertices.iter().map(|[x, y]| [x * w, y * h]).collect(),
            band,
        },
    };

    let mut weights = vec![0u8; width as usize * height as usize];
    weights
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let py = y as f32 + 0.5;
            for (x, weight) in row.iter_mut().enumerate() {
                *weight = shape.weight(x as f32 + 0.5, py);
            }
        });

    RasterMask::new(width, height, weights)
}

/// Ordered regions; later entries draw over earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionList {
    regions: Vec<MaskRegion>,
}

impl RegionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, region: MaskRegion) {
        self.regions.push(region);
    }

    pub fn remove(&mut self, index: usize) -> Option<MaskRegion> {
        (index < self.regions.len()).then(|| self.regions.remove(index))
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut MaskRegion> {
        self.regions.get_mut(index)
    }

    /// Swap the region at `index` with the one before it.
    pub fn move_up(&mut self, index: usize) -> bool {
        index > 0 && self.swap(index - 1, index)
    }

    /// Swap the region at `index` with the one after it.
    pub fn move_down(&mut self, index: usize) -> bool {
        index
            .checked_add(1)
            .is_some_and(|next| self.swap(index, next))
    }

    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if a == b || a >= self.regions.len() || b >= self.regions.len() {
            return false;
        }
        self.regions.swap(a, b);
        true
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MaskRegion> {
        self.regions.iter()
    }

    pub fn as_slice(&self) -> &[MaskRegion] {
        &self.regions
    }
}

impl From<Vec<MaskRegion>> for RegionList {
    fn from(regions: Vec<MaskRegion>) -> Self {
        Self { regions }
    }
}

impl<'a> IntoIterator for &'a RegionList {
    type Item = &'a MaskRegion;
    type IntoIter = std::slice::Iter<'a, MaskRegion>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn circle(feather: f32) -> MaskRegion {
        MaskRegion::new(
            Geometry::Circle {
                center_x: 0.5,
                center_y: 0.5,
                radius: 0.25,
            },
            Algorithm::Atkinson,
        )
        .feather(feather)
    }

    #[test]
    fn test_circle_centre_and_outside() {
        let mask = rasterize(&circle(0.0), 100, 100).unwrap();
        assert_eq!(mask.get(50, 50), 255);
        assert_eq!(mask.get(0, 0), 0);
        assert_eq!(mask.get(99, 50), 0);
    }

    #[test]
    fn test_circle_hard_edge_is_binary() {
        let mask = rasterize(&circle(0.0), 64, 48).unwrap();
        assert!(mask.weights().iter().all(|&w| w == 0 || w == 255));
    }

    #[test]
    fn test_circle_feather_band() {
        // Radius 25 px, feather band [20, 25].
        let mask = rasterize(&circle(0.2), 100, 100).unwrap();
        // Pixel 72 has its centre 22.5 px from the middle.
        let edge = mask.get(72, 50);
        assert!(edge > 0 && edge < 255, "edge weight {edge}");
        assert_eq!(mask.get(68, 50), 255);
        assert_eq!(mask.get(76, 50), 0);
    }

    #[test]
    fn test_weights_rise_toward_centre() {
        let mask = rasterize(&circle(0.5), 100, 100).unwrap();
        let row: Vec<u8> = (50..100).map(|x| mask.get(x, 50)).collect();
        assert!(row.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_rectangle_feather_ramps_inward() {
        let region = MaskRegion::new(
            Geometry::Rectangle {
                x1: 0.9,
                y1: 0.9,
                x2: 0.1,
                y2: 0.1,
            },
            Algorithm::Ordered,
        )
        .feather(0.1);
        let mask = rasterize(&region, 100, 100).unwrap();
        assert_eq!(mask.get(5, 50), 0);
        assert_eq!(mask.get(50, 50), 255);
        // 0.5 px inside the left edge of a 10 px band.
        assert_eq!(mask.get(10, 50), 13);
        assert_eq!(mask.get(19, 50), 242);
    }

    #[test]
    fn test_polygon_even_odd() {
        let region = MaskRegion::new(
            Geometry::Polygon {
                vertices: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            },
            Algorithm::Random,
        );
        let mask = rasterize(&region, 10, 10).unwrap();
        assert_eq!(mask.get(1, 1), 255);
        assert_eq!(mask.get(9, 9), 0);
    }

    #[test]
    fn test_invalid_geometry() {
        let cases = [
            Geometry::Circle {
                center_x: 0.5,
                center_y: 0.5,
                radius: 0.0,
            },
            Geometry::Rectangle {
                x1: 0.2,
                y1: 0.1,
                x2: 0.2,
                y2: 0.9,
            },
            Geometry::Polygon {
                vertices: vec![[0.0, 0.0], [1.0, 1.0]],
            },
            Geometry::Circle {
                center_x: f32::NAN,
                center_y: 0.5,
                radius: 0.1,
            },
        ];
        for geometry in cases {
            let region = MaskRegion::new(geometry, Algorithm::Ordered);
            assert!(matches!(
                rasterize(&region, 10, 10),
                Err(DitherError::InvalidRegionGeometry(_))
            ));
        }
        assert!(matches!(
            rasterize(&circle(0.75), 10, 10),
            Err(DitherError::InvalidRegionGeometry(_))
        ));
    }

    #[test]
    fn test_region_serde_shape() {
        let json = r#"{"type":"circle","center_x":0.5,"center_y":0.4,"radius":0.2,
            "feather":0.1,"algorithm":"floydSteinberg","params":{"dot_size":2}}"#;
        let region: MaskRegion = serde_json::from_str(json).unwrap();
        assert_eq!(region.algorithm, Algorithm::FloydSteinberg);
        assert_eq!(region.params.dot_size, 2);
        assert_eq!(
            region.geometry,
            Geometry::Circle {
                center_x: 0.5,
                center_y: 0.4,
                radius: 0.2
            }
        );
    }

    #[test]
    fn test_region_list_reordering() {
        let mut list = RegionList::new();
        for algorithm in [Algorithm::Ordered, Algorithm::Atkinson, Algorithm::Random] {
            list.push(circle(0.0));
            list.get_mut(list.len() - 1).unwrap().algorithm = algorithm;
        }
        let order = |list: &RegionList| list.iter().map(|r| r.algorithm).collect::<Vec<_>>();

        assert!(!list.move_up(0));
        assert!(!list.move_down(2));
        assert!(list.move_up(2));
        assert_eq!(order(&list), [Algorithm::Ordered, Algorithm::Random, Algorithm::Atkinson]);
        assert!(list.move_down(0));
        assert_eq!(order(&list), [Algorithm::Random, Algorithm::Ordered, Algorithm::Atkinson]);
        assert_eq!(list.remove(1).map(|r| r.algorithm), Some(Algorithm::Ordered));
        assert!(list.remove(5).is_none());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_region_list_moves_at_index_extremes() {
        let mut list = RegionList::new();
        list.push(circle(0.0));
        list.push(circle(0.1));
        let before = list.clone();

        assert!(!list.move_down(usize::MAX));
        assert!(!list.move_up(usize::MAX));
        assert!(!list.move_down(usize::MAX - 1));
        assert_eq!(list, before);
    }
}
