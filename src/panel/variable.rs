use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::panel::AttributeTable;

/// How a variable behaves under areal reallocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// Rate or density; area-weighted average.
    Intensive,
    /// Count or total; area-weighted sum, conserved.
    Extensive,
}

/// A variable name with its mandatory intensive/extensive tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    pub kind: VariableKind,
}

impl VariableSpec {
    pub fn intensive(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: VariableKind::Intensive }
    }

    pub fn extensive(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: VariableKind::Extensive }
    }

    /// Tag two name lists at once: intensive first, then extensive.
    pub fn from_lists<S: AsRef<str>>(intensive: &[S], extensive: &[S]) -> Vec<Self> {
        intensive.iter().map(|name| Self::intensive(name.as_ref()))
            .chain(extensive.iter().map(|name| Self::extensive(name.as_ref())))
            .collect()
    }
}

/// Every variable must be tagged exactly once and exist in `table`.
pub(crate) fn validate(specs: &[VariableSpec], table: &AttributeTable) -> Result<()> {
    let mut seen = AHashSet::with_capacity(specs.len());
    for spec in specs {
        if !seen.insert(spec.name.as_str()) {
            return Err(Error::AmbiguousVariable(spec.name.clone()))
        }
        if !table.contains(&spec.name) {
            return Err(Error::UnknownVariable(spec.name.clone()))
        }
    }
    Ok(())
}
