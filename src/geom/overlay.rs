use geo::{Area, BooleanOps, BoundingRect, MultiPolygon};
use rayon::prelude::*;
use spatial_weights::BoundingBox;

use crate::error::{Diagnostic, Result};
use crate::geom::Tessellation;

/// Intersections at or below this fraction of the smaller unit's area are
/// treated as degenerate (shared edges, floating-point slivers).
pub const AREA_TOLERANCE: f64 = 1e-12;

/// Coverage ratios this close to 1 are reported as exactly 1.
pub const COVERAGE_TOLERANCE: f64 = 1e-9;

/// One non-empty intersection between a source and a target unit.
#[derive(Debug, Clone)]
pub struct OverlayCell {
    pub source: usize,
    pub target: usize,
    pub area: f64,
    pub geometry: MultiPolygon<f64>,
}

/// Sparse (source, target) → intersection table between two tessellations.
#[derive(Debug, Clone)]
pub struct Overlay {
    cells: Vec<OverlayCell>,     // sorted by (source, target)
    by_target: Vec<Vec<usize>>,  // cell indices per target row, ascending source
    coverage: Vec<f64>,          // per source row
    diagnostics: Vec<Diagnostic>,
}

impl Overlay {
    /// All non-empty intersections, sorted by (source, target).
    #[inline] pub fn cells(&self) -> &[OverlayCell] { &self.cells }

    /// Cells whose target is `target`, in ascending source order.
    pub fn cells_for_target(&self, target: usize) -> impl Iterator<Item = &OverlayCell> + '_ {
        self.by_target[target].iter().map(|&c| &self.cells[c])
    }

    /// Indices into `cells()` whose target is `target`.
    #[inline] pub(crate) fn cell_indices_for_target(&self, target: usize) -> &[usize] { &self.by_target[target] }

    /// Fraction of the source unit's area covered by target units.
    #[inline] pub fn coverage_ratio(&self, source: usize) -> f64 { self.coverage[source] }

    /// `CoverageIncomplete` diagnostics for every source with coverage below 1.
    #[inline] pub fn diagnostics(&self) -> &[Diagnostic] { &self.diagnostics }

    /// Area-weighted coverage over the whole source tessellation.
    pub fn total_coverage_ratio(&self, source: &Tessellation) -> f64 {
        let total = (0..source.len()).map(|i| source.area(i)).sum::<f64>();
        if total <= 0.0 { return 0.0 }
        let covered = self.cells.iter().map(|cell| cell.area).sum::<f64>();
        snap_to_one(covered / total)
    }
}

#[inline]
pub(crate) fn snap_to_one(ratio: f64) -> f64 {
    if (1.0 - ratio).abs() <= COVERAGE_TOLERANCE { 1.0 } else { ratio }
}

/// Compute pairwise intersections between `source` and `target`.
///
/// Both tessellations must declare the same (projected, equal-area
/// appropriate) EPSG code.  Candidate pairs come from the target R-tree, and
/// each source unit is processed independently in parallel.
pub fn overlay(source: &Tessellation, target: &Tessellation) -> Result<Overlay> {
    source.ensure_same_crs(target.epsg())?;

    let cells = (0..source.len()).into_par_iter()
        .map(|i| source_cells(source, target, i))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    let mut by_target = vec![Vec::new(); target.len()];
    let mut covered = vec![0.0; source.len()];
    for (c, cell) in cells.iter().enumerate() {
        by_target[cell.target].push(c);
        covered[cell.source] += cell.area;
    }

    let mut diagnostics = Vec::new();
    let coverage = covered.iter().enumerate()
        .map(|(i, &area)| {
            let total = source.area(i);
            if total <= 0.0 { return 0.0 }
            let ratio = snap_to_one(area / total);
            if ratio < 1.0 {
                Diagnostic::CoverageIncomplete { unit: source.id(i).clone(), coverage_ratio: ratio }
                    .record(&mut diagnostics);
            }
            ratio
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        sources = source.len(),
        targets = target.len(),
        cells = cells.len(),
        incomplete = diagnostics.len(),
        "computed overlay"
    );

    Ok(Overlay { cells, by_target, coverage, diagnostics })
}

/// Non-empty intersections of source unit `i` with every target, sorted by target.
fn source_cells(source: &Tessellation, target: &Tessellation, i: usize) -> Vec<OverlayCell> {
    let shape = source.shape(i);
    let Some(rect) = shape.bounding_rect() else { return Vec::new() };

    let mut candidates = target.query(&BoundingBox::search_envelope(&rect, 0.0))
        .map(|bb| bb.idx())
        .collect::<Vec<_>>();
    candidates.sort_unstable();

    candidates.into_iter()
        .filter_map(|j| {
            let geometry = shape.intersection(target.shape(j));
            let area = geometry.unsigned_area();
            let floor = AREA_TOLERANCE * source.area(i).min(target.area(j));
            (area > floor && area > 0.0).then(|| OverlayCell { source: i, target: j, area, geometry })
        })
        .collect()
}
