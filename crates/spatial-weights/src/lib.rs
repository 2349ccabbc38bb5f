pub mod adj;
pub mod bbox;
pub mod build;
pub mod error;
pub mod rule;
pub mod unit;

pub use adj::AdjacencyMatrix;
pub use bbox::BoundingBox;
pub use build::build;
pub use error::WeightsError;
pub use rule::Rule;
pub use unit::UnitId;
