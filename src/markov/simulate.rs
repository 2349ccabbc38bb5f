use std::collections::BTreeMap;
use std::ops::Bound;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

use crate::error::{Diagnostic, Error, Result};
use crate::markov::lag::lag_classes;
use crate::markov::{ClusterLabeling, Label, TransitionModel};
use crate::panel::{GeoId, Time};
use crate::weights::WeightsSource;

/// The observed base layer followed by one synthetic layer per step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub base_time: Time,
    pub time_step: Time,
    /// Base layer and synthetic layers, keyed by time.
    pub layers: BTreeMap<Time, BTreeMap<GeoId, Label>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SimulationResult {
    /// The observed layer the simulation started from.
    pub fn base(&self) -> Option<&BTreeMap<GeoId, Label>> { self.layers.get(&self.base_time) }

    /// Synthetic layers in time order.
    pub fn synthetic(&self) -> impl Iterator<Item = (Time, &BTreeMap<GeoId, Label>)> + '_ {
        self.layers.range((Bound::Excluded(self.base_time), Bound::Unbounded)).map(|(&time, layer)| (time, layer))
    }

    /// Times of all layers, base first.
    pub fn times(&self) -> impl Iterator<Item = Time> + '_ { self.layers.keys().copied() }

    /// Convert into a labeling, e.g. to feed another estimation round.
    pub fn to_labeling(&self) -> ClusterLabeling {
        let mut labeling = ClusterLabeling::new();
        for (&time, layer) in &self.layers {
            labeling.insert_layer(time, layer.iter().map(|(id, &label)| (id.clone(), label)));
        }
        labeling
    }
}

/// Run the spatially-conditioned Markov chain forward `steps` times from the
/// observed layer at `base_time`.
///
/// Each step computes lag classes from the latest layer (observed for the
/// first step, synthetic afterwards) over the graph at `base_time`, then
/// draws every unit's next label in ascending id order from a `StdRng`
/// seeded with `seed`.  An undefined conditional row falls back to the
/// global row; if that is undefined too the label is frozen.
/// `time_step` defaults to the smallest gap between observed layers.
pub fn simulate(
    labeling: &ClusterLabeling,
    model: &TransitionModel,
    weights: &impl WeightsSource,
    base_time: Time,
    steps: usize,
    seed: u64,
    time_step: Option<Time>,
) -> Result<SimulationResult> {
    let base = labeling.layer(base_time).ok_or(Error::MissingTime(base_time))?;
    let graph = weights.weights_at(base_time)?;

    let time_step = time_step.or_else(|| labeling.min_time_step()).unwrap_or(1);
    // Times grow monotonically, so checking the last one covers every step.
    step_time(base_time, steps, time_step)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut diagnostics = Vec::new();
    let mut layers = BTreeMap::from([(base_time, base.clone())]);
    let mut current = base.clone();

    for step in 1..=steps {
        let time = step_time(base_time, step, time_step)?;
        let lags = lag_classes(&current, graph);

        let mut next = BTreeMap::new();
        for ((unit, &origin), lag) in current.iter().zip(lags) {
            let row = match model.conditional(lag).and_then(|matrix| matrix.row(origin)) {
                Some(row) => row,
                None => match model.global().row(origin) {
                    Some(row) => {
                        Diagnostic::GlobalFallback { unit: unit.clone(), time, lag, origin }.record(&mut diagnostics);
                        row
                    }
                    None => {
                        Diagnostic::FrozenLabel { unit: unit.clone(), time, label: origin }.record(&mut diagnostics);
                        next.insert(unit.clone(), origin);
                        continue
                    }
                },
            };
            next.insert(unit.clone(), sample(model.labels(), &row, rng.random::<f64>()));
        }

        layers.insert(time, next.clone());
        current = next;
    }

    tracing::info!(base_time, time_step, steps, seed, diagnostics = diagnostics.len(), "simulation finished");

    Ok(SimulationResult { base_time, time_step, layers, diagnostics })
}

/// Time of synthetic layer `step`; fails unless `time_step` is positive and
/// the result fits in `Time`.
fn step_time(base_time: Time, step: usize, time_step: Time) -> Result<Time> {
    if time_step <= 0 {
        return Err(Error::InvalidTimeStep(time_step))
    }
    Time::try_from(step).ok()
        .and_then(|step| step.checked_mul(time_step))
        .and_then(|offset| base_time.checked_add(offset))
        .ok_or(Error::InvalidTimeStep(time_step))
}

/// Inverse-CDF draw: the first label whose cumulative probability exceeds
/// `u`.  Rounding shortfalls land on the last label with positive mass.
fn sample(labels: &[Label], row: &[f64], u: f64) -> Label {
    let mut cumulative = 0.0;
    let mut last = labels[0];
    for (&label, &p) in labels.iter().zip(row) {
        if p <= 0.0 { continue }
        cumulative += p;
        last = label;
        if u < cumulative { return label }
    }
    last
}
