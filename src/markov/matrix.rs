use ndarray::{Array2, ArrayView2};
use serde::Serialize;

use crate::markov::Label;

/// One edge of a transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionEdge {
    pub origin: Label,
    pub destination: Label,
    pub probability: f64,
}

/// K×K transition counts indexed by origin (row) and destination (column)
/// label, both in ascending label order.  Probabilities are the row-normalized
/// counts; a row with no observations is undefined rather than uniform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionMatrix {
    labels: Vec<Label>,
    counts: Array2<u64>,
}

impl TransitionMatrix {
    /// An all-zero matrix over `labels`, which must be sorted and distinct.
    pub(crate) fn new(labels: Vec<Label>) -> Self {
        let k = labels.len();
        Self { labels, counts: Array2::zeros((k, k)) }
    }

    /// Tally one observed transition.  Labels outside the matrix are ignored.
    pub(crate) fn record(&mut self, origin: Label, destination: Label) {
        if let (Some(i), Some(j)) = (self.position(origin), self.position(destination)) {
            self.counts[[i, j]] += 1;
        }
    }

    #[inline]
    fn position(&self, label: Label) -> Option<usize> { self.labels.binary_search(&label).ok() }

    /// Labels in row/column order.
    #[inline] pub fn labels(&self) -> &[Label] { &self.labels }

    /// Raw counts.
    #[inline] pub fn counts(&self) -> ArrayView2<'_, u64> { self.counts.view() }

    /// Observed transitions `origin -> destination`.
    pub fn count(&self, origin: Label, destination: Label) -> u64 {
        match (self.position(origin), self.position(destination)) {
            (Some(i), Some(j)) => self.counts[[i, j]],
            _ => 0,
        }
    }

    /// Observed transitions leaving `origin`.
    pub fn row_total(&self, origin: Label) -> u64 {
        self.position(origin).map_or(0, |i| self.counts.row(i).sum())
    }

    /// Total observed transitions.
    pub fn total(&self) -> u64 { self.counts.sum() }

    /// Returns `true` if the row of `origin` has at least one observation.
    #[inline] pub fn is_defined(&self, origin: Label) -> bool { self.row_total(origin) > 0 }

    /// Probabilities of moving from `origin` to each label, in label order;
    /// `None` when the row is undefined.
    pub fn row(&self, origin: Label) -> Option<Vec<f64>> {
        let i = self.position(origin)?;
        let total = self.counts.row(i).sum();
        if total == 0 { return None }
        Some(self.counts.row(i).iter().map(|&c| c as f64 / total as f64).collect())
    }

    /// Probability of `origin -> destination`; `None` when the row is undefined.
    pub fn probability(&self, origin: Label, destination: Label) -> Option<f64> {
        let j = self.position(destination)?;
        self.row(origin).map(|row| row[j])
    }

    /// Origins whose rows have no observations.
    pub fn insufficient_rows(&self) -> impl Iterator<Item = Label> + '_ {
        self.labels.iter().copied().filter(|&label| !self.is_defined(label))
    }

    /// Edges with probability at least `min_probability` (and above zero),
    /// ordered by origin then destination.
    pub fn edges(&self, min_probability: f64) -> Vec<TransitionEdge> {
        self.labels.iter()
            .filter_map(|&origin| self.row(origin).map(|row| (origin, row)))
            .flat_map(|(origin, row)| {
                self.labels.iter().zip(row)
                    .filter(|&(_, p)| p > 0.0 && p >= min_probability)
                    .map(move |(&destination, probability)| TransitionEdge { origin, destination, probability })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Number of edges leaving `label` at the given threshold.
    pub fn out_degree(&self, label: Label, min_probability: f64) -> usize {
        self.edges(min_probability).iter().filter(|edge| edge.origin == label).count()
    }

    /// Number of edges entering `label` at the given threshold.
    pub fn in_degree(&self, label: Label, min_probability: f64) -> usize {
        self.edges(min_probability).iter().filter(|edge| edge.destination == label).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[u32]) -> Vec<Label> { raw.iter().map(|&l| Label(l)).collect() }

    fn make_test_matrix() -> TransitionMatrix {
        let mut m = TransitionMatrix::new(labels(&[0, 1, 2]));
        m.record(Label(0), Label(0));
        m.record(Label(0), Label(1));
        m.record(Label(0), Label(1));
        m.record(Label(1), Label(1));
        m
    }

    #[test]
    fn defined_rows_sum_to_one() {
        let m = make_test_matrix();
        for origin in [Label(0), Label(1)] {
            let sum = m.row(origin).unwrap().iter().sum::<f64>();
            assert!((sum - 1.0).abs() < 1e-9);
        }
        assert!((m.probability(Label(0), Label(1)).unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_rows_are_undefined_not_uniform() {
        let m = make_test_matrix();
        assert!(!m.is_defined(Label(2)));
        assert_eq!(m.row(Label(2)), None);
        assert_eq!(m.probability(Label(2), Label(2)), None);
        assert_eq!(m.insufficient_rows().collect::<Vec<_>>(), vec![Label(2)]);
    }

    #[test]
    fn unknown_labels_are_ignored() {
        let mut m = make_test_matrix();
        m.record(Label(9), Label(0));
        assert_eq!(m.total(), 4);
        assert_eq!(m.count(Label(9), Label(0)), 0);
        assert_eq!(m.row(Label(9)), None);
    }

    #[test]
    fn edges_respect_threshold() {
        let m = make_test_matrix();
        assert_eq!(m.edges(0.0).len(), 3);
        assert_eq!(m.edges(0.5).len(), 2);
        assert_eq!(m.out_degree(Label(0), 0.0), 2);
        assert_eq!(m.in_degree(Label(1), 0.0), 2);
        assert_eq!(m.in_degree(Label(2), 0.0), 0);
    }
}
