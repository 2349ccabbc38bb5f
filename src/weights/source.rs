use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::panel::Time;
use crate::weights::SpatialWeights;

/// Supplies the neighbor graph in effect at a given time: one static graph
/// for constant boundaries, or one graph per time layer.
pub trait WeightsSource {
    fn weights_at(&self, time: Time) -> Result<&SpatialWeights>;
}

impl WeightsSource for SpatialWeights {
    #[inline]
    fn weights_at(&self, _time: Time) -> Result<&SpatialWeights> { Ok(self) }
}

impl WeightsSource for BTreeMap<Time, SpatialWeights> {
    fn weights_at(&self, time: Time) -> Result<&SpatialWeights> {
        self.get(&time).ok_or(Error::MissingTime(time))
    }
}

impl<W: WeightsSource + ?Sized> WeightsSource for &W {
    #[inline]
    fn weights_at(&self, time: Time) -> Result<&SpatialWeights> { (**self).weights_at(time) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::GeoId;

    #[test]
    fn static_graph_serves_every_time() {
        let weights = SpatialWeights::from_edges(vec![GeoId::from("a")], []).unwrap();
        assert!(weights.weights_at(1990).is_ok());
        assert!(weights.weights_at(2050).is_ok());
    }

    #[test]
    fn per_layer_graphs_require_the_time() {
        let graphs = BTreeMap::from([(2000, SpatialWeights::from_edges(vec![GeoId::from("a")], []).unwrap())]);
        assert_eq!(graphs.weights_at(2000).unwrap().len(), 1);
        assert!(matches!(graphs.weights_at(2010), Err(Error::MissingTime(2010))));
    }
}
