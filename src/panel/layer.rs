use std::{collections::BTreeMap, sync::Arc};

use crate::error::{Error, Result};
use crate::geom::Tessellation;
use crate::panel::{AttributeTable, GeoId, Time};

/// One time layer of a panel: a tessellation and its attribute rows.
#[derive(Debug, Clone)]
pub struct PanelLayer {
    time: Time,
    geometry: Arc<Tessellation>,
    data: AttributeTable,
}

impl PanelLayer {
    /// Pair attribute rows with a tessellation; row counts must agree.
    pub fn new(time: Time, geometry: impl Into<Arc<Tessellation>>, data: AttributeTable) -> Result<Self> {
        let geometry = geometry.into();
        if geometry.len() != data.num_rows() {
            return Err(Error::RowCountMismatch { expected: geometry.len(), found: data.num_rows() })
        }
        Ok(Self { time, geometry, data })
    }

    #[inline] pub fn time(&self) -> Time { self.time }

    #[inline] pub fn geometry(&self) -> &Arc<Tessellation> { &self.geometry }

    #[inline] pub fn data(&self) -> &AttributeTable { &self.data }

    #[inline] pub fn len(&self) -> usize { self.geometry.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geometry.is_empty() }

    /// Value of `variable` for unit `id`; `None` if the unit, the column or
    /// the value is missing.
    pub fn value(&self, id: &GeoId, variable: &str) -> Option<f64> {
        self.geometry.row(id).and_then(|row| self.data.get(variable, row))
    }
}

/// A collection of time layers keyed by time.
#[derive(Debug, Clone, Default)]
pub struct Panel {
    layers: BTreeMap<Time, PanelLayer>,
}

impl Panel {
    pub fn new() -> Self { Self::default() }

    /// Build a panel from layers; a later layer replaces an earlier one with
    /// the same time.
    pub fn from_layers(layers: impl IntoIterator<Item = PanelLayer>) -> Self {
        Self { layers: layers.into_iter().map(|layer| (layer.time(), layer)).collect() }
    }

    /// Insert a layer, returning the one it replaced, if any.
    pub fn insert(&mut self, layer: PanelLayer) -> Option<PanelLayer> {
        self.layers.insert(layer.time(), layer)
    }

    #[inline] pub fn len(&self) -> usize { self.layers.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.layers.is_empty() }

    /// Times in ascending order.
    pub fn times(&self) -> impl Iterator<Item = Time> + '_ { self.layers.keys().copied() }

    /// Layers in ascending time order.
    pub fn layers(&self) -> impl Iterator<Item = &PanelLayer> + '_ { self.layers.values() }

    #[inline] pub fn layer(&self, time: Time) -> Option<&PanelLayer> { self.layers.get(&time) }

    /// Layer at `time`, or `MissingTime`.
    pub fn require(&self, time: Time) -> Result<&PanelLayer> {
        self.layer(time).ok_or(Error::MissingTime(time))
    }

    /// Value of `variable` for (`id`, `time`).
    pub fn value(&self, id: &GeoId, time: Time, variable: &str) -> Option<f64> {
        self.layer(time).and_then(|layer| layer.value(id, variable))
    }
}
