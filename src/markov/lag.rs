use std::collections::BTreeMap;

use rayon::prelude::*;
use smallvec::SmallVec;

use crate::markov::{Label, Lag};
use crate::panel::GeoId;
use crate::weights::SpatialWeights;

/// Modal label among the neighbors of `unit` that are labeled in `layer`.
/// Ties go to the smallest label; a unit without labeled neighbors (or
/// outside the graph) gets `Lag::None`.
pub fn lag_class(unit: &GeoId, layer: &BTreeMap<GeoId, Label>, weights: &SpatialWeights) -> Lag {
    let mut tally: SmallVec<[(Label, u32); 8]> = SmallVec::new();
    for label in weights.neighbors(unit).into_iter().flatten().filter_map(|n| layer.get(n)) {
        match tally.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => tally.push((*label, 1)),
        }
    }

    tally.into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map_or(Lag::None, |(label, _)| Lag::Modal(label))
}

/// Lag class of every unit in `layer`, in the layer's (ascending id) order.
pub(crate) fn lag_classes(layer: &BTreeMap<GeoId, Label>, weights: &SpatialWeights) -> Vec<Lag> {
    let units = layer.keys().collect::<Vec<_>>();
    units.par_iter()
        .map(|unit| lag_class(unit, layer, weights))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Star: "hub" adjacent to "a", "b", "c"; "lone" isolated.
    fn make_test_weights() -> SpatialWeights {
        let ids = ["hub", "a", "b", "c", "lone"].map(GeoId::from).to_vec();
        let edges = ["a", "b", "c"].map(|n| (GeoId::from("hub"), GeoId::from(n)));
        SpatialWeights::from_edges(ids, edges).unwrap()
    }

    fn layer(labels: &[(&str, u32)]) -> BTreeMap<GeoId, Label> {
        labels.iter().map(|&(id, l)| (GeoId::from(id), Label(l))).collect()
    }

    #[test]
    fn modal_neighbor_label_wins() {
        let layer = layer(&[("hub", 0), ("a", 2), ("b", 2), ("c", 1)]);
        assert_eq!(lag_class(&"hub".into(), &layer, &make_test_weights()), Lag::Modal(Label(2)));
    }

    #[test]
    fn ties_go_to_smallest_label() {
        let layer = layer(&[("hub", 0), ("a", 3), ("b", 1)]);
        assert_eq!(lag_class(&"hub".into(), &layer, &make_test_weights()), Lag::Modal(Label(1)));
    }

    #[test]
    fn no_labeled_neighbors_is_none() {
        let weights = make_test_weights();
        let layer = layer(&[("hub", 0), ("lone", 1)]);
        assert_eq!(lag_class(&"lone".into(), &layer, &weights), Lag::None);
        assert_eq!(lag_class(&"hub".into(), &layer, &weights), Lag::None);
        assert_eq!(lag_class(&"ghost".into(), &layer, &weights), Lag::None);
    }

    #[test]
    fn lag_classes_follow_layer_order() {
        let layer = layer(&[("hub", 0), ("a", 1), ("lone", 1)]);
        let lags = lag_classes(&layer, &make_test_weights());
        // Order: a, hub, lone.
        assert_eq!(lags, vec![Lag::Modal(Label(0)), Lag::Modal(Label(1)), Lag::None]);
    }
}
