use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Diagnostic, Error, Result};
use crate::markov::lag::lag_classes;
use crate::markov::{ClusterLabeling, Label, Lag, TransitionMatrix};
use crate::weights::WeightsSource;

/// Global and lag-conditioned transition matrices estimated from a labeling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionModel {
    labels: Vec<Label>,
    global: TransitionMatrix,
    conditional: BTreeMap<Lag, TransitionMatrix>,
    diagnostics: Vec<Diagnostic>,
}

impl TransitionModel {
    /// The shared label set, ascending.
    #[inline] pub fn labels(&self) -> &[Label] { &self.labels }

    /// Transitions regardless of lag class.
    #[inline] pub fn global(&self) -> &TransitionMatrix { &self.global }

    /// Transitions of units whose lag class was `lag`.
    #[inline] pub fn conditional(&self, lag: Lag) -> Option<&TransitionMatrix> { self.conditional.get(&lag) }

    /// Every lag class with its matrix: `Lag::None` first, then each label.
    pub fn conditionals(&self) -> impl Iterator<Item = (Lag, &TransitionMatrix)> + '_ {
        self.conditional.iter().map(|(&lag, matrix)| (lag, matrix))
    }

    /// Undefined rows found during estimation.
    #[inline] pub fn diagnostics(&self) -> &[Diagnostic] { &self.diagnostics }
}

/// Estimate transition matrices from every pair of consecutive layers of
/// `labeling`.  Lag classes at time t use the neighbor graph for t.
pub fn estimate(labeling: &ClusterLabeling, weights: &impl WeightsSource) -> Result<TransitionModel> {
    if labeling.len() < 2 {
        return Err(Error::InsufficientLayers(labeling.len()))
    }
    let labels = labeling.common_label_set()?.into_iter().collect::<Vec<_>>();

    let mut global = TransitionMatrix::new(labels.clone());
    let mut conditional = std::iter::once(Lag::None)
        .chain(labels.iter().copied().map(Lag::Modal))
        .map(|lag| (lag, TransitionMatrix::new(labels.clone())))
        .collect::<BTreeMap<_, _>>();

    let times = labeling.times().collect::<Vec<_>>();
    for pair in times.windows(2) {
        let (t0, t1) = (pair[0], pair[1]);
        let graph = weights.weights_at(t0)?;
        let (Some(before), Some(after)) = (labeling.layer(t0), labeling.layer(t1)) else { continue };

        for ((unit, &origin), lag) in before.iter().zip(lag_classes(before, graph)) {
            let Some(&destination) = after.get(unit) else { continue };
            global.record(origin, destination);
            if let Some(matrix) = conditional.get_mut(&lag) {
                matrix.record(origin, destination);
            }
        }
    }

    let mut diagnostics = Vec::new();
    for origin in global.insufficient_rows() {
        Diagnostic::InsufficientData { lag: None, origin }.record(&mut diagnostics);
    }
    for (&lag, matrix) in &conditional {
        for origin in matrix.insufficient_rows() {
            Diagnostic::InsufficientData { lag: Some(lag), origin }.record(&mut diagnostics);
        }
    }

    tracing::debug!(
        layers = times.len(),
        labels = labels.len(),
        transitions = global.total(),
        undefined_rows = diagnostics.len(),
        "estimated transition model"
    );

    Ok(TransitionModel { labels, global, conditional, diagnostics })
}
