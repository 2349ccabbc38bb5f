mod engine;
mod panel;

pub use engine::{harmonize, Harmonized, HarmonizeRequest, WeightsMethod};
pub use panel::{harmonize_panel, HarmonizedPanel};
