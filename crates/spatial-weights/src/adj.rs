use ahash::AHashSet;

use crate::error::WeightsError;
use crate::unit::UnitId;

/// A read-only CSR (Compressed Sparse Row) adjacency matrix over units.
///
/// `offsets[u]..offsets[u+1]` indexes into `neighbors` to give the sorted
/// list of units adjacent to unit `u`.  Supports O(log deg) membership tests
/// via binary search.  Units with no neighbors keep an empty row; they are
/// never dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyMatrix {
    /// CSR row offsets; length = `num_units + 1`.
    offsets: Vec<u32>,
    /// Flattened neighbor lists; sorted within each row.
    neighbors: Vec<UnitId>,
}

impl AdjacencyMatrix {
    /// Build a matrix from per-unit neighbor lists.  Rows are sorted and
    /// deduplicated; self-loops and out-of-range units are rejected.
    pub fn from_lists(lists: Vec<Vec<UnitId>>) -> Result<Self, WeightsError> {
        let num_units = lists.len();
        let mut offsets = Vec::with_capacity(num_units + 1);
        let mut neighbors = Vec::with_capacity(lists.iter().map(Vec::len).sum());
        offsets.push(0u32);

        for (u, mut row) in lists.into_iter().enumerate() {
            for &v in &row {
                if v.index() >= num_units { return Err(WeightsError::OutOfRange { unit: v, num_units }) }
                if v.index() == u { return Err(WeightsError::SelfLoop(v)) }
            }
            row.sort_unstable();
            row.dedup();
            neighbors.extend(row);
            offsets.push(neighbors.len() as u32);
        }

        Ok(Self { offsets, neighbors })
    }

    /// Build a matrix over `num_units` units from undirected edges; each
    /// pair is inserted in both directions.
    pub fn from_edges(num_units: usize, edges: impl IntoIterator<Item = (UnitId, UnitId)>) -> Result<Self, WeightsError> {
        let mut lists = vec![Vec::new(); num_units];
        for (a, b) in edges {
            for unit in [a, b] {
                if unit.index() >= num_units { return Err(WeightsError::OutOfRange { unit, num_units }) }
            }
            lists[a.index()].push(b);
            lists[b.index()].push(a);
        }
        Self::from_lists(lists)
    }

    /// Number of units covered by this matrix.
    #[inline] pub fn num_units(&self) -> usize { self.offsets.len() - 1 }

    /// Number of directed neighbor entries (twice the edge count when symmetric).
    #[inline] pub fn num_entries(&self) -> usize { self.neighbors.len() }

    #[inline]
    fn range(&self, unit: UnitId) -> std::ops::Range<usize> {
        self.offsets[unit.index()] as usize .. self.offsets[unit.index() + 1] as usize
    }

    /// Sorted slice of units adjacent to `unit`.
    #[inline]
    pub fn neighbors(&self, unit: UnitId) -> &[UnitId] {
        &self.neighbors[self.range(unit)]
    }

    /// Number of neighbors of `unit`.
    #[inline] pub fn degree(&self, unit: UnitId) -> usize { self.range(unit).len() }

    /// Returns `true` if `other` is adjacent to `unit` (binary search).
    pub fn contains(&self, unit: UnitId, other: UnitId) -> bool {
        self.neighbors(unit).binary_search(&other).is_ok()
    }

    /// Units with an empty neighbor set.
    pub fn isolates(&self) -> impl Iterator<Item = UnitId> + '_ {
        (0..self.num_units()).map(UnitId::from).filter(|&u| self.degree(u) == 0)
    }

    /// Returns `true` if every edge `u -> v` has a matching `v -> u`.
    pub fn is_symmetric(&self) -> bool {
        (0..self.num_units()).map(UnitId::from)
            .all(|u| self.neighbors(u).iter().all(|&v| self.contains(v, u)))
    }

    /// Union of this matrix with its transpose.
    pub fn symmetrized(&self) -> Self {
        let mut sets = vec![AHashSet::new(); self.num_units()];
        for u in (0..self.num_units()).map(UnitId::from) {
            for &v in self.neighbors(u) {
                sets[u.index()].insert(v);
                sets[v.index()].insert(u);
            }
        }

        let lists = sets.into_iter()
            .map(|set| set.into_iter().collect::<Vec<_>>())
            .collect::<Vec<_>>();

        // Rows come from a valid matrix, so neither check in from_lists can fire.
        Self::from_lists(lists).unwrap_or_else(|_| self.clone())
    }
}
