#![doc = "Boundary harmonization and spatially-conditioned Markov simulation of neighborhood change"]
mod common;
pub mod config;
mod error;
mod geom;
mod harmonize;
mod markov;
mod panel;
mod weights;

#[doc(inline)]
pub use common::CancelToken;

#[doc(inline)]
pub use error::{Diagnostic, Error, Result, Side};

#[doc(inline)]
pub use geom::{
    overlay, GeographicUnit, MaskedUnit, Overlay, OverlayCell, Raster, RasterMask, Tessellation,
    AREA_TOLERANCE, COVERAGE_TOLERANCE, NLCD_DEVELOPED,
};

#[doc(inline)]
pub use harmonize::{harmonize, harmonize_panel, HarmonizeRequest, Harmonized, HarmonizedPanel, WeightsMethod};

#[doc(inline)]
pub use markov::{
    estimate, lag_class, simulate, ClusterLabeling, Label, Lag, SimulationResult, TransitionEdge,
    TransitionMatrix, TransitionModel,
};

#[doc(inline)]
pub use panel::{AttributeTable, GeoId, Panel, PanelLayer, Time, VariableKind, VariableSpec};

#[doc(inline)]
pub use weights::{Rule, SpatialWeights, WeightsSource};
