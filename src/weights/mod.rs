mod source;
mod weights;

pub use source::WeightsSource;
pub use weights::SpatialWeights;
pub use spatial_weights::Rule;
