use ahash::AHashMap;
use geo::{Area, BoundingRect, MultiPolygon};
use rstar::{RTree, AABB};
use spatial_weights::BoundingBox;

use crate::error::{Error, Result};
use crate::panel::GeoId;

/// An immutable polygon geometry with its identifier, valid for one snapshot.
#[derive(Debug, Clone)]
pub struct GeographicUnit {
    pub id: GeoId,
    pub geometry: MultiPolygon<f64>,
}

impl GeographicUnit {
    pub fn new(id: impl Into<GeoId>, geometry: MultiPolygon<f64>) -> Self {
        Self { id: id.into(), geometry }
    }
}

/// Tessellation represents one snapshot of non-overlapping MultiPolygons, with
/// an R-tree over their bounding boxes and the EPSG code of their (projected)
/// coordinate reference system.
#[derive(Debug, Clone)]
pub struct Tessellation {
    ids: Vec<GeoId>,
    index: AHashMap<GeoId, usize>,
    shapes: Vec<MultiPolygon<f64>>,
    areas: Vec<f64>,
    rtree: RTree<BoundingBox>,
    epsg: Option<u32>, // EPSG code, if known
}

impl Tessellation {
    /// Construct a Tessellation from its units.  Ids must be unique; empty
    /// geometries are kept as rows but never returned by spatial queries.
    pub fn new(units: Vec<GeographicUnit>, epsg: Option<u32>) -> Result<Self> {
        let mut index = AHashMap::with_capacity(units.len());
        for (i, unit) in units.iter().enumerate() {
            if index.insert(unit.id.clone(), i).is_some() {
                return Err(Error::DuplicateUnit(unit.id.clone()))
            }
        }

        let (ids, shapes): (Vec<_>, Vec<_>) = units.into_iter()
            .map(|unit| (unit.id, unit.geometry))
            .unzip();

        Ok(Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
            areas: shapes.iter().map(|shape| shape.unsigned_area()).collect(),
            ids,
            index,
            shapes,
            epsg,
        })
    }

    /// Get the number of units.
    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no units.
    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    /// Unit ids in row order.
    #[inline] pub fn ids(&self) -> &[GeoId] { &self.ids }

    /// Id of the unit at `row`.
    #[inline] pub fn id(&self, row: usize) -> &GeoId { &self.ids[row] }

    /// Row of the unit with the given id.
    #[inline] pub fn row(&self, id: &GeoId) -> Option<usize> { self.index.get(id).copied() }

    /// Get a reference to the list of MultiPolygons.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    /// Geometry of the unit at `row`.
    #[inline] pub fn shape(&self, row: usize) -> &MultiPolygon<f64> { &self.shapes[row] }

    /// Planar area of the unit at `row`.
    #[inline] pub fn area(&self, row: usize) -> f64 { self.areas[row] }

    /// Get the EPSG code, if known.
    #[inline] pub fn epsg(&self) -> Option<u32> { self.epsg }

    /// Query the R-tree for bounding boxes intersecting the given envelope.
    #[inline]
    pub(crate) fn query(&self, envelope: &AABB<[f64; 2]>) -> impl Iterator<Item = &BoundingBox> {
        self.rtree.locate_in_envelope_intersecting(envelope)
    }

    /// Fail with `CrsMismatch` unless both this tessellation and `other`
    /// declare the same EPSG code.
    pub fn ensure_same_crs(&self, other: Option<u32>) -> Result<()> {
        ensure_same_crs(self.epsg, other)
    }
}

/// Missing metadata on either side counts as a mismatch.
pub(crate) fn ensure_same_crs(left: Option<u32>, right: Option<u32>) -> Result<()> {
    match (left, right) {
        (Some(a), Some(b)) if a == b => Ok(()),
        _ => Err(Error::CrsMismatch { left, right }),
    }
}
