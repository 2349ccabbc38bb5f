//! Error types for the harmonization and simulation engines.
//!
//! Fatal failures abort an operation before any output is produced and are
//! returned as [`Error`].  Data gaps that a batch run should survive are
//! recorded as [`Diagnostic`]s on the result instead.

use serde::Serialize;

use crate::markov::{Label, Lag};
use crate::panel::{GeoId, Time};

/// Fatal errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Coordinate reference systems are missing or disagree.
    #[error("coordinate reference systems disagree: {left:?} vs {right:?}")]
    CrsMismatch {
        /// EPSG code of the first input.
        left: Option<u32>,
        /// EPSG code of the second input.
        right: Option<u32>,
    },

    /// Dasymetric weighting was requested without a raster.
    #[error("dasymetric weighting requires a raster")]
    MissingRaster,

    /// Dasymetric weighting was requested without in-mask class codes.
    #[error("dasymetric weighting requires at least one in-mask class code")]
    MissingCodes,

    /// Two time layers of a labeling use different label sets.
    #[error("label set at time {time} ({found:?}) differs from time {reference} ({expected:?})")]
    LabelSetMismatch {
        /// Time of the layer defining the reference label set.
        reference: Time,
        /// Time of the offending layer.
        time: Time,
        /// Reference label set.
        expected: Vec<Label>,
        /// Label set of the offending layer.
        found: Vec<Label>,
    },

    /// Transition estimation needs at least two time layers.
    #[error("need at least two time layers, found {0}")]
    InsufficientLayers(usize),

    /// No layer (or no weights graph) exists for the requested time.
    #[error("no layer for time {0}")]
    MissingTime(Time),

    /// Simulated layers must move forward in time.
    #[error("time step must be positive and keep layer times in range, got {0}")]
    InvalidTimeStep(Time),

    /// A unit id appears twice within one snapshot.
    #[error("duplicate unit id {0}")]
    DuplicateUnit(GeoId),

    /// A unit id is not part of the snapshot it was looked up in.
    #[error("unknown unit id {0}")]
    UnknownUnit(GeoId),

    /// A requested variable is not a column of the source layer.
    #[error("variable {0:?} not found in source layer")]
    UnknownVariable(String),

    /// A variable was tagged more than once in the same request.
    #[error("variable {0:?} is tagged more than once")]
    AmbiguousVariable(String),

    /// Attribute rows do not line up with the geometry rows.
    #[error("expected {expected} rows, found {found}")]
    RowCountMismatch {
        /// Rows in the geometry.
        expected: usize,
        /// Rows supplied.
        found: usize,
    },

    /// The caller cancelled the operation; partial results were discarded.
    #[error("operation cancelled")]
    Cancelled,

    /// Spatial weights construction failed.
    #[error(transparent)]
    Weights(#[from] spatial_weights::WeightsError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Which side of an overlay a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side { Source, Target }

/// Non-fatal conditions attached to results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A source unit's overlay area does not add up to its own area.
    CoverageIncomplete { unit: GeoId, coverage_ratio: f64 },

    /// A unit has no in-mask raster cells; full-area weights were used.
    MaskFallback { unit: GeoId, side: Side },

    /// A target unit overlaps no source unit; its values are missing.
    NoSourceOverlap { unit: GeoId },

    /// A target unit overlaps sources, none of which has a value for `variable`.
    NoValuedSource { unit: GeoId, variable: String },

    /// A transition-matrix row has no observations.  `lag` is `None` for the
    /// global matrix.
    InsufficientData { lag: Option<Lag>, origin: Label },

    /// A conditional row was undefined during simulation; the global row was used.
    GlobalFallback { unit: GeoId, time: Time, lag: Lag, origin: Label },

    /// Both the conditional and global rows were undefined; the label was kept.
    FrozenLabel { unit: GeoId, time: Time, label: Label },
}

impl Diagnostic {
    /// Log this diagnostic and append it to `sink`.
    pub(crate) fn record(self, sink: &mut Vec<Diagnostic>) {
        match &self {
            Diagnostic::InsufficientData { .. } | Diagnostic::GlobalFallback { .. } => {
                tracing::debug!(diagnostic = ?self, "recorded diagnostic");
            }
            _ => tracing::warn!(diagnostic = ?self, "recorded diagnostic"),
        }
        sink.push(self);
    }
}
