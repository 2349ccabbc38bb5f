use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::common::CancelToken;
use crate::error::{Diagnostic, Error, Result, Side};
use crate::geom::{ensure_same_crs, overlay, snap_to_one, Overlay, Raster, RasterMask, Tessellation};
use crate::panel::{validate_variables, AttributeTable, PanelLayer, Time, VariableKind, VariableSpec};

/// How overlay cells are weighted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightsMethod {
    /// Full intersection area.
    #[default]
    Area,
    /// Intersection area restricted to in-mask raster cells.
    Dasymetric,
}

/// What to reallocate and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonizeRequest {
    pub variables: Vec<VariableSpec>,
    #[serde(default)]
    pub method: WeightsMethod,
    /// In-mask raster class codes; required for dasymetric weighting.
    #[serde(default)]
    pub codes: Option<Vec<i32>>,
}

impl HarmonizeRequest {
    /// Areal interpolation of `variables`.
    pub fn areal(variables: Vec<VariableSpec>) -> Self {
        Self { variables, method: WeightsMethod::Area, codes: None }
    }

    /// Dasymetric interpolation of `variables`, restricted to raster cells
    /// whose class is in `codes`.
    pub fn dasymetric(variables: Vec<VariableSpec>, codes: impl Into<Vec<i32>>) -> Self {
        Self { variables, method: WeightsMethod::Dasymetric, codes: Some(codes.into()) }
    }

    /// Fail fast on anything that would make the request unrunnable.
    pub(crate) fn validate(&self, source: &PanelLayer, target: &Tessellation, raster: Option<&Raster>) -> Result<()> {
        validate_variables(&self.variables, source.data())?;
        if self.method == WeightsMethod::Dasymetric {
            let raster = raster.ok_or(Error::MissingRaster)?;
            self.in_mask_codes()?;
            ensure_same_crs(raster.epsg(), target.epsg())?;
        }
        source.geometry().ensure_same_crs(target.epsg())
    }

    fn in_mask_codes(&self) -> Result<&[i32]> {
        self.codes.as_deref().filter(|codes| !codes.is_empty()).ok_or(Error::MissingCodes)
    }
}

/// A harmonized layer together with the diagnostics raised producing it.
#[derive(Debug, Clone)]
pub struct Harmonized {
    pub layer: PanelLayer,
    pub diagnostics: Vec<Diagnostic>,
}

/// Per-cell weights for one overlay.
struct CellWeights {
    intensive: Vec<f64>,  // per cell
    extensive: Vec<f64>,  // per cell, already divided by the source denominator
    /// Full intersection areas, used for averaging when the valued cells of a
    /// target carry no intensive weight.  Only set for masked weighting.
    fallback: Option<Vec<f64>>,
}

/// Reallocate the requested variables of `source` onto `target`, producing a
/// new layer stamped with `time`.  `source` is left untouched.
///
/// Fatal errors (`UnknownVariable`, `AmbiguousVariable`, `MissingRaster`,
/// `MissingCodes`, `CrsMismatch`) are raised before any work is done.
/// Cancellation is checked once per target unit; a cancelled run returns
/// `Cancelled` and no output.
pub fn harmonize(
    source: &PanelLayer,
    target: &Arc<Tessellation>,
    time: Time,
    request: &HarmonizeRequest,
    raster: Option<&Raster>,
    cancel: Option<&CancelToken>,
) -> Result<Harmonized> {
    request.validate(source, target, raster)?;

    // Scoped acquisition: the mask lives until this call returns.
    let mask = match (request.method, raster) {
        (WeightsMethod::Dasymetric, Some(raster)) => Some(raster.mask(request.in_mask_codes()?)?),
        _ => None,
    };

    let ov = overlay(source.geometry(), target)?;
    let mut diagnostics = ov.diagnostics().to_vec();

    let weights = match &mask {
        None => areal_weights(&ov, source.geometry()),
        Some(mask) => dasymetric_weights(&ov, source.geometry(), target, mask, cancel, &mut diagnostics)?,
    };

    let mut columns = request.variables.iter()
        .map(|spec| (spec.name.as_str(), spec.kind, Vec::with_capacity(target.len())))
        .collect::<Vec<_>>();

    for j in 0..target.len() {
        CancelToken::check(cancel)?;

        let cells = ov.cell_indices_for_target(j);
        if cells.is_empty() {
            Diagnostic::NoSourceOverlap { unit: target.id(j).clone() }.record(&mut diagnostics);
            columns.iter_mut().for_each(|(_, _, values)| values.push(None));
            continue;
        }

        let mut fell_back = false;
        for (name, kind, values) in columns.iter_mut() {
            let (name, kind) = (*name, *kind);
            let contributions = cells.iter()
                .filter_map(|&c| {
                    let cell = &ov.cells()[c];
                    source.data().get(name, cell.source).map(|value| (c, value))
                })
                .collect::<Vec<_>>();

            let value = match kind {
                VariableKind::Intensive => weighted_mean(&contributions, &weights.intensive).or_else(|| {
                    let full = weights.fallback.as_deref().filter(|_| !contributions.is_empty())?;
                    fell_back = true;
                    weighted_mean(&contributions, full)
                }),
                VariableKind::Extensive => weighted_sum(&contributions, &weights.extensive),
            };

            if value.is_none() {
                Diagnostic::NoValuedSource { unit: target.id(j).clone(), variable: name.to_string() }
                    .record(&mut diagnostics);
            }
            values.push(value);
        }

        if fell_back {
            Diagnostic::MaskFallback { unit: target.id(j).clone(), side: Side::Target }.record(&mut diagnostics);
        }
    }

    let data = AttributeTable::from_columns(
        target.len(),
        columns.into_iter().map(|(name, _, values)| (name, values)),
    )?;

    tracing::debug!(
        source_time = source.time(),
        time,
        method = ?request.method,
        variables = request.variables.len(),
        targets = target.len(),
        diagnostics = diagnostics.len(),
        "harmonized layer"
    );

    Ok(Harmonized { layer: PanelLayer::new(time, Arc::clone(target), data)?, diagnostics })
}

/// Plain areal weights: intersection area, and the share of the source area.
fn areal_weights(ov: &Overlay, source: &Tessellation) -> CellWeights {
    CellWeights {
        intensive: ov.cells().iter().map(|cell| cell.area).collect(),
        extensive: ov.cells().iter().map(|cell| snap_to_one(cell.area / source.area(cell.source))).collect(),
        fallback: None,
    }
}

/// Mask-restricted weights.  Averages whose valued cells have no in-mask
/// area fall back to full intersection area (decided per variable by the
/// caller); sources without in-mask area fall back to full-area shares for
/// summation.
fn dasymetric_weights(
    ov: &Overlay,
    source: &Tessellation,
    target: &Tessellation,
    mask: &RasterMask<'_>,
    cancel: Option<&CancelToken>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<CellWeights> {
    // Masked area of every cell, computed per target unit.
    let per_target = (0..target.len()).into_par_iter()
        .map(|j| {
            CancelToken::check(cancel)?;
            Ok(ov.cell_indices_for_target(j).iter()
                .map(|&c| (c, mask.masked_area(&ov.cells()[c].geometry)))
                .collect::<Vec<_>>())
        })
        .collect::<Result<Vec<_>>>()?;

    let mut masked = vec![0.0; ov.cells().len()];
    for (c, area) in per_target.iter().flatten() { masked[*c] = *area; }

    // Masked area of every source unit, the denominator for extensive shares.
    let source_masked = (0..source.len()).into_par_iter()
        .map(|i| {
            CancelToken::check(cancel)?;
            Ok(mask.masked_area(source.shape(i)))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut fallback_sources = vec![false; source.len()];
    for cell in ov.cells() {
        if source_masked[cell.source] <= 0.0 && !fallback_sources[cell.source] {
            fallback_sources[cell.source] = true;
            Diagnostic::MaskFallback { unit: source.id(cell.source).clone(), side: Side::Source }.record(diagnostics);
        }
    }

    let extensive = ov.cells().iter().zip(&masked)
        .map(|(cell, &area)| {
            let share = if fallback_sources[cell.source] {
                cell.area / source.area(cell.source)
            } else {
                area / source_masked[cell.source]
            };
            snap_to_one(share)
        })
        .collect();

    let fallback = ov.cells().iter().map(|cell| cell.area).collect();
    Ok(CellWeights { intensive: masked, extensive, fallback: Some(fallback) })
}

/// Normalized weighted average over (cell, value) contributions, clamped to
/// the range of contributing values.
fn weighted_mean(contributions: &[(usize, f64)], weights: &[f64]) -> Option<f64> {
    let total = contributions.iter().map(|&(c, _)| weights[c]).sum::<f64>();
    if total <= 0.0 { return None }

    let mean = contributions.iter().map(|&(c, v)| (weights[c] / total) * v).sum::<f64>();
    let (lo, hi) = contributions.iter()
        .filter(|&&(c, _)| weights[c] > 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, v)| (lo.min(v), hi.max(v)));
    Some(mean.clamp(lo, hi))
}

/// Sum of source values scaled by their per-cell shares.
fn weighted_sum(contributions: &[(usize, f64)], shares: &[f64]) -> Option<f64> {
    if contributions.is_empty() { return None }
    Some(contributions.iter().map(|&(c, v)| shares[c] * v).sum())
}
