mod estimate;
mod label;
mod lag;
mod matrix;
mod simulate;

pub use estimate::{estimate, TransitionModel};
pub use label::{ClusterLabeling, Label, Lag};
pub use lag::lag_class;
pub use matrix::{TransitionEdge, TransitionMatrix};
pub use simulate::{simulate, SimulationResult};
