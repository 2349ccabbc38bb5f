use std::fmt;

use crate::unit::UnitId;

/// Errors that can occur when building spatial weights.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightsError {
    /// A rule string could not be parsed (e.g. `"knn:x"`).
    InvalidRule(String),
    /// An edge list referenced a unit outside `0..num_units`.
    OutOfRange { unit: UnitId, num_units: usize },
    /// An edge list contained an edge from a unit to itself.
    SelfLoop(UnitId),
    /// A DE-9IM predicate could not be evaluated.
    Predicate(String),
}

impl fmt::Display for WeightsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightsError::InvalidRule(rule) => write!(f, "invalid weights rule: {rule:?}"),
            WeightsError::OutOfRange { unit, num_units } => {
                write!(f, "{unit} is out of range for {num_units} units")
            }
            WeightsError::SelfLoop(unit) => write!(f, "self-loop on {unit}"),
            WeightsError::Predicate(msg) => write!(f, "relate predicate failed: {msg}"),
        }
    }
}

impl std::error::Error for WeightsError {}
