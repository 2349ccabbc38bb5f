use std::{collections::BTreeSet, ops::Range};

use geo::{Area, BooleanOps, BoundingRect, Coord, MultiPolygon, Rect};
use ndarray::Array2;
use rayon::prelude::*;

use crate::common::CancelToken;
use crate::error::{Error, Result};
use crate::geom::Tessellation;

/// NLCD land-cover classes for developed land (open space, low, medium and
/// high intensity).
pub const NLCD_DEVELOPED: [i32; 4] = [21, 22, 23, 24];

/// A north-up grid of integer class codes, already materialized in memory.
#[derive(Debug, Clone)]
pub struct Raster {
    values: Array2<i32>,   // (rows, cols); row 0 is the northernmost row
    origin: Coord<f64>,    // top-left corner of cell (0, 0)
    cell_width: f64,
    cell_height: f64,
    epsg: Option<u32>,
}

impl Raster {
    /// Construct a raster from its cell values, top-left origin and cell size.
    pub fn new(values: Array2<i32>, origin: Coord<f64>, cell_width: f64, cell_height: f64, epsg: Option<u32>) -> Self {
        assert!(cell_width > 0.0 && cell_height > 0.0, "cell size must be positive");
        Self { values, origin, cell_width, cell_height, epsg }
    }

    #[inline] pub fn rows(&self) -> usize { self.values.nrows() }

    #[inline] pub fn cols(&self) -> usize { self.values.ncols() }

    #[inline] pub fn value(&self, row: usize, col: usize) -> i32 { self.values[[row, col]] }

    #[inline] pub fn epsg(&self) -> Option<u32> { self.epsg }

    /// Area of a single cell.
    #[inline] pub fn cell_area(&self) -> f64 { self.cell_width * self.cell_height }

    /// Rectangle covered by columns `cols` of row `row`.
    fn span_rect(&self, row: usize, cols: Range<usize>) -> Rect<f64> {
        let top = self.origin.y - row as f64 * self.cell_height;
        Rect::new(
            Coord { x: self.origin.x + cols.start as f64 * self.cell_width, y: top - self.cell_height },
            Coord { x: self.origin.x + cols.end as f64 * self.cell_width, y: top },
        )
    }

    /// Rectangle covered by a single cell.
    pub fn cell_rect(&self, row: usize, col: usize) -> Rect<f64> {
        self.span_rect(row, col..col + 1)
    }

    /// Rows and columns of the cells overlapping `rect`, clamped to the grid.
    fn window(&self, rect: &Rect<f64>) -> Option<(Range<usize>, Range<usize>)> {
        let clamp = |v: f64, max: usize| v.max(0.0).min(max as f64) as usize;

        let col_start = clamp(((rect.min().x - self.origin.x) / self.cell_width).floor(), self.cols());
        let col_end = clamp(((rect.max().x - self.origin.x) / self.cell_width).ceil(), self.cols());
        let row_start = clamp(((self.origin.y - rect.max().y) / self.cell_height).floor(), self.rows());
        let row_end = clamp(((self.origin.y - rect.min().y) / self.cell_height).ceil(), self.rows());

        (col_start < col_end && row_start < row_end).then_some((row_start..row_end, col_start..col_end))
    }

    /// Acquire a mask over this raster for the given in-mask class codes.
    /// The mask borrows the raster and releases its membership grid on drop.
    pub fn mask(&self, codes: &[i32]) -> Result<RasterMask<'_>> {
        if codes.is_empty() { return Err(Error::MissingCodes) }

        let codes = codes.iter().copied().collect::<BTreeSet<_>>();
        let membership = self.values.map(|value| codes.contains(value));
        tracing::debug!(
            rows = self.rows(),
            cols = self.cols(),
            codes = ?codes,
            in_mask = membership.iter().filter(|&&m| m).count(),
            "acquired raster mask"
        );

        Ok(RasterMask { raster: self, codes, membership })
    }
}

/// Masked sub-geometry of one unit.
#[derive(Debug, Clone)]
pub struct MaskedUnit {
    pub geometry: MultiPolygon<f64>,
    pub area: f64,
}

/// Scoped handle pairing a raster with its in-mask class codes.
#[derive(Debug)]
pub struct RasterMask<'a> {
    raster: &'a Raster,
    codes: BTreeSet<i32>,
    membership: Array2<bool>,
}

impl<'a> RasterMask<'a> {
    #[inline] pub fn raster(&self) -> &'a Raster { self.raster }

    #[inline] pub fn codes(&self) -> &BTreeSet<i32> { &self.codes }

    /// Returns `true` if the cell's class is one of the in-mask codes.
    #[inline] pub fn in_mask(&self, row: usize, col: usize) -> bool { self.membership[[row, col]] }

    /// Rectangles of horizontally consecutive in-mask cells overlapping `rect`.
    fn runs(&self, rect: &Rect<f64>) -> Vec<Rect<f64>> {
        let Some((rows, cols)) = self.raster.window(rect) else { return Vec::new() };

        let mut runs = Vec::new();
        for row in rows {
            let mut start = None;
            for col in cols.clone() {
                match (self.in_mask(row, col), start) {
                    (true, None) => start = Some(col),
                    (false, Some(s)) => {
                        runs.push(self.raster.span_rect(row, s..col));
                        start = None;
                    }
                    _ => {}
                }
            }
            if let Some(s) = start {
                runs.push(self.raster.span_rect(row, s..cols.end));
            }
        }
        runs
    }

    /// Pixel-aligned clip of `shape` to the in-mask cells.
    pub fn masked_geometry(&self, shape: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        let Some(rect) = shape.bounding_rect() else { return MultiPolygon(vec![]) };
        MultiPolygon(
            self.runs(&rect).into_iter()
                .flat_map(|run| run.to_polygon().intersection(shape).0)
                .collect()
        )
    }

    /// Area of `shape` lying on in-mask cells.
    pub fn masked_area(&self, shape: &MultiPolygon<f64>) -> f64 {
        let Some(rect) = shape.bounding_rect() else { return 0.0 };
        self.runs(&rect).into_iter()
            .map(|run| run.to_polygon().intersection(shape).unsigned_area())
            .sum()
    }

    /// Masked sub-geometry and sub-area of every unit of `tessellation`.
    /// Units are processed in parallel; cancellation is checked per unit.
    pub fn mask_tessellation(&self, tessellation: &Tessellation, cancel: Option<&CancelToken>) -> Result<Vec<MaskedUnit>> {
        tessellation.ensure_same_crs(self.raster.epsg())?;

        (0..tessellation.len()).into_par_iter()
            .map(|row| {
                CancelToken::check(cancel)?;
                let geometry = self.masked_geometry(tessellation.shape(row));
                let area = geometry.unsigned_area();
                Ok(MaskedUnit { geometry, area })
            })
            .collect()
    }
}
