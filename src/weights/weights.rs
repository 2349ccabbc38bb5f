use ahash::AHashMap;
use spatial_weights::{AdjacencyMatrix, Rule, UnitId};

use crate::error::{Error, Result};
use crate::geom::Tessellation;
use crate::panel::GeoId;

/// A neighbor graph over the units of one snapshot, keyed by GeoId.
///
/// Rows follow the order of the ids the graph was built from.  Units without
/// neighbors keep an empty row.
#[derive(Debug, Clone)]
pub struct SpatialWeights {
    ids: Vec<GeoId>,
    index: AHashMap<GeoId, usize>,
    rule: Option<Rule>, // None for graphs built from explicit edges
    matrix: AdjacencyMatrix,
}

impl SpatialWeights {
    /// Build the graph of `tessellation` under `rule`.
    pub fn build(tessellation: &Tessellation, rule: Rule) -> Result<Self> {
        let matrix = spatial_weights::build(tessellation.shapes(), rule)?;
        let weights = Self {
            ids: tessellation.ids().to_vec(),
            index: tessellation.ids().iter().cloned().enumerate().map(|(i, id)| (id, i)).collect(),
            rule: Some(rule),
            matrix,
        };

        tracing::debug!(
            %rule,
            units = weights.len(),
            entries = weights.matrix.num_entries(),
            isolates = weights.isolates().count(),
            "built spatial weights"
        );
        Ok(weights)
    }

    /// Build under `rule`, adding the reverse of every one-way edge when the
    /// rule can produce a directed graph.
    pub fn build_symmetric(tessellation: &Tessellation, rule: Rule) -> Result<Self> {
        let mut weights = Self::build(tessellation, rule)?;
        if !rule.is_symmetric() {
            weights.matrix = weights.matrix.symmetrized();
        }
        Ok(weights)
    }

    /// Build a symmetric graph over `ids` from undirected id pairs.
    pub fn from_edges(ids: Vec<GeoId>, edges: impl IntoIterator<Item = (GeoId, GeoId)>) -> Result<Self> {
        let mut index = AHashMap::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            if index.insert(id.clone(), i).is_some() {
                return Err(Error::DuplicateUnit(id.clone()))
            }
        }

        let lookup = |id: GeoId| index.get(&id).map(|&i| UnitId::from(i)).ok_or(Error::UnknownUnit(id));
        let edges = edges.into_iter()
            .map(|(a, b)| Ok((lookup(a)?, lookup(b)?)))
            .collect::<Result<Vec<_>>>()?;

        let matrix = AdjacencyMatrix::from_edges(ids.len(), edges)?;
        Ok(Self { ids, index, rule: None, matrix })
    }

    #[inline] pub fn len(&self) -> usize { self.ids.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    /// Unit ids in row order.
    #[inline] pub fn ids(&self) -> &[GeoId] { &self.ids }

    /// The rule this graph was built with, if any.
    #[inline] pub fn rule(&self) -> Option<Rule> { self.rule }

    /// Underlying index-based adjacency.
    #[inline] pub fn matrix(&self) -> &AdjacencyMatrix { &self.matrix }

    #[inline] pub fn contains(&self, id: &GeoId) -> bool { self.index.contains_key(id) }

    /// Neighbors of `id`, or `None` if the unit is not part of this graph.
    pub fn neighbors(&self, id: &GeoId) -> Option<impl Iterator<Item = &GeoId> + '_> {
        let row = *self.index.get(id)?;
        Some(self.matrix.neighbors(UnitId::from(row)).iter().map(|u| &self.ids[u.index()]))
    }

    /// Number of neighbors of `id`; zero for unknown units.
    pub fn degree(&self, id: &GeoId) -> usize {
        self.index.get(id).map_or(0, |&row| self.matrix.degree(UnitId::from(row)))
    }

    /// Returns `true` if `a` and `b` are neighbors.
    pub fn is_neighbor(&self, a: &GeoId, b: &GeoId) -> bool {
        let (Some(&a), Some(&b)) = (self.index.get(a), self.index.get(b)) else { return false };
        self.matrix.contains(UnitId::from(a), UnitId::from(b))
    }

    /// Units with no neighbors.
    pub fn isolates(&self) -> impl Iterator<Item = &GeoId> + '_ {
        self.matrix.isolates().map(|u| &self.ids[u.index()])
    }

    #[inline] pub fn is_symmetric(&self) -> bool { self.matrix.is_symmetric() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::test_support::{square, tessellation};
    use spatial_weights::WeightsError;

    fn ids(raw: &[&str]) -> Vec<GeoId> { raw.iter().map(|&s| GeoId::from(s)).collect() }

    /// Two touching squares and one far away.
    fn make_test_weights() -> SpatialWeights {
        let tess = tessellation(&[
            ("a", square(0.0, 0.0, 1.0)),
            ("b", square(1.0, 0.0, 1.0)),
            ("c", square(10.0, 10.0, 1.0)),
        ]);
        SpatialWeights::build(&tess, Rule::Queen).unwrap()
    }

    #[test]
    fn build_keeps_ids_and_isolates() {
        let weights = make_test_weights();
        assert_eq!(weights.len(), 3);
        assert_eq!(weights.rule(), Some(Rule::Queen));
        assert!(weights.is_neighbor(&"a".into(), &"b".into()));
        assert_eq!(weights.isolates().collect::<Vec<_>>(), vec![&GeoId::from("c")]);
        assert_eq!(weights.neighbors(&"c".into()).unwrap().count(), 0);
        assert!(weights.is_symmetric());
    }

    #[test]
    fn knn_graphs_can_be_symmetrized() {
        // Centroids at x = 0.5, 1.5 and 3.5: "c" points at "b" but not back.
        let tess = tessellation(&[
            ("a", square(0.0, 0.0, 1.0)),
            ("b", square(1.0, 0.0, 1.0)),
            ("c", square(3.0, 0.0, 1.0)),
        ]);

        let directed = SpatialWeights::build(&tess, Rule::Knn { k: 1 }).unwrap();
        assert!(!directed.is_symmetric());
        assert!(!directed.is_neighbor(&"b".into(), &"c".into()));

        let weights = SpatialWeights::build_symmetric(&tess, Rule::Knn { k: 1 }).unwrap();
        assert!(weights.is_symmetric());
        assert_eq!(weights.neighbors(&"b".into()).unwrap().collect::<Vec<_>>(), vec![&GeoId::from("a"), &GeoId::from("c")]);
        assert_eq!(weights.degree(&"c".into()), 1);

        let queen = SpatialWeights::build_symmetric(&tess, Rule::Queen).unwrap();
        assert_eq!(queen.matrix(), SpatialWeights::build(&tess, Rule::Queen).unwrap().matrix());
    }

    #[test]
    fn unknown_units_have_no_neighbors() {
        let weights = make_test_weights();
        assert!(weights.neighbors(&"zzz".into()).is_none());
        assert_eq!(weights.degree(&"zzz".into()), 0);
    }

    #[test]
    fn explicit_edges_are_symmetric() {
        let weights = SpatialWeights::from_edges(ids(&["x", "y", "z"]), [("x".into(), "y".into())]).unwrap();
        assert_eq!(weights.rule(), None);
        assert_eq!(weights.neighbors(&"y".into()).unwrap().collect::<Vec<_>>(), vec![&GeoId::from("x")]);
        assert_eq!(weights.isolates().collect::<Vec<_>>(), vec![&GeoId::from("z")]);
    }

    #[test]
    fn explicit_self_loops_are_rejected() {
        let err = SpatialWeights::from_edges(ids(&["x"]), [("x".into(), "x".into())]).unwrap_err();
        assert!(matches!(err, Error::Weights(WeightsError::SelfLoop(_))));
    }

    #[test]
    fn explicit_edges_must_name_known_units() {
        let err = SpatialWeights::from_edges(ids(&["x"]), [("x".into(), "q".into())]).unwrap_err();
        assert!(matches!(err, Error::UnknownUnit(id) if id.as_str() == "q"));

        let err = SpatialWeights::from_edges(ids(&["x", "x"]), []).unwrap_err();
        assert!(matches!(err, Error::DuplicateUnit(_)));
    }
}
