mod geo_id;
mod layer;
mod table;
mod variable;

pub use geo_id::GeoId;
pub use layer::{Panel, PanelLayer};
pub use table::AttributeTable;
pub use variable::{VariableKind, VariableSpec};
pub(crate) use variable::validate as validate_variables;

/// A discrete time stamp (typically a census year).
pub type Time = i32;
