use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::panel::{GeoId, Time};

/// A categorical neighborhood type, supplied by an external clustering step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Spatial lag class of a unit: the modal label of its labeled neighbors,
/// or `None` when it has none.  `None` orders before every label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lag {
    None,
    Modal(Label),
}

impl fmt::Display for Lag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lag::None => write!(f, "none"),
            Lag::Modal(label) => write!(f, "{label}"),
        }
    }
}

// Serialized as a string so lag classes can key JSON maps.
impl Serialize for Lag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Assignment of labels to (unit, time).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterLabeling {
    layers: BTreeMap<Time, BTreeMap<GeoId, Label>>,
}

impl ClusterLabeling {
    pub fn new() -> Self { Self::default() }

    /// Label `unit` at `time`, returning the label it replaced.
    pub fn insert(&mut self, unit: impl Into<GeoId>, time: Time, label: Label) -> Option<Label> {
        self.layers.entry(time).or_default().insert(unit.into(), label)
    }

    /// Replace the whole layer at `time`.
    pub fn insert_layer(&mut self, time: Time, labels: impl IntoIterator<Item = (GeoId, Label)>) {
        self.layers.insert(time, labels.into_iter().collect());
    }

    /// Number of time layers.
    #[inline] pub fn len(&self) -> usize { self.layers.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.layers.is_empty() }

    /// Times in ascending order.
    pub fn times(&self) -> impl Iterator<Item = Time> + '_ { self.layers.keys().copied() }

    /// Labels at `time`, ordered by unit id.
    #[inline] pub fn layer(&self, time: Time) -> Option<&BTreeMap<GeoId, Label>> { self.layers.get(&time) }

    pub fn label(&self, unit: &GeoId, time: Time) -> Option<Label> {
        self.layer(time).and_then(|layer| layer.get(unit).copied())
    }

    /// Distinct labels used at `time`.
    pub fn label_set(&self, time: Time) -> BTreeSet<Label> {
        self.layer(time).map(|layer| layer.values().copied().collect()).unwrap_or_default()
    }

    /// Smallest gap between consecutive times, if there are at least two.
    pub fn min_time_step(&self) -> Option<Time> {
        let times = self.times().collect::<Vec<_>>();
        times.windows(2).map(|w| w[1].saturating_sub(w[0])).min()
    }

    /// The label set shared by every layer; `LabelSetMismatch` names the
    /// first layer that disagrees with the earliest one.
    pub fn common_label_set(&self) -> Result<BTreeSet<Label>> {
        let mut times = self.times();
        let Some(reference) = times.next() else { return Ok(BTreeSet::new()) };
        let expected = self.label_set(reference);

        for time in times {
            let found = self.label_set(time);
            if found != expected {
                return Err(Error::LabelSetMismatch {
                    reference,
                    time,
                    expected: expected.into_iter().collect(),
                    found: found.into_iter().collect(),
                })
            }
        }
        Ok(expected)
    }
}
