use geo::{Coord, Rect};
use rstar::{RTreeObject, AABB};

/// A bounding box in an R-tree, associated with a geometry by index.
#[derive(Debug, Clone)]
pub struct BoundingBox {
    idx: usize, // Index of corresponding MultiPolygon in the input slice
    bbox: Rect<f64>,
}

impl BoundingBox {
    pub fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Get the index of the corresponding geometry.
    #[inline] pub fn idx(&self) -> usize { self.idx }

    /// Get a reference to the bounding rectangle.
    #[inline] pub fn bbox(&self) -> &Rect<f64> { &self.bbox }

    /// Envelope of `rect` grown by `pad` on every side.
    pub fn search_envelope(rect: &Rect<f64>, pad: f64) -> AABB<[f64; 2]> {
        AABB::from_corners(
            [rect.min().x - pad, rect.min().y - pad],
            [rect.max().x + pad, rect.max().y + pad],
        )
    }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// A centroid in an R-tree, associated with a geometry by index.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CentroidPoint {
    pub(crate) idx: usize,
    pub(crate) coord: Coord<f64>,
}

impl CentroidPoint {
    /// Euclidean distance to `other`.
    #[inline]
    pub(crate) fn distance(&self, other: Coord<f64>) -> f64 {
        (self.coord.x - other.x).hypot(self.coord.y - other.y)
    }
}

impl RTreeObject for CentroidPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.coord.x, self.coord.y])
    }
}
