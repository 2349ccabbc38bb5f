use std::collections::BTreeMap;

use crate::common::CancelToken;
use crate::error::{Diagnostic, Result};
use crate::geom::Raster;
use crate::harmonize::{harmonize, HarmonizeRequest};
use crate::panel::{AttributeTable, Panel, PanelLayer, Time};

/// A panel on constant boundaries, with the diagnostics of each reallocated layer.
#[derive(Debug, Clone)]
pub struct HarmonizedPanel {
    pub panel: Panel,
    pub diagnostics: BTreeMap<Time, Vec<Diagnostic>>,
}

/// Reallocate every layer of `panel` onto the geometry of `target_time`.
///
/// The target layer's requested variables are copied verbatim; every other
/// layer goes through [`harmonize`].  All layers are validated before any of
/// them is reallocated, so a fatal error never leaves a half-built panel.
pub fn harmonize_panel(
    panel: &Panel,
    target_time: Time,
    request: &HarmonizeRequest,
    raster: Option<&Raster>,
    cancel: Option<&CancelToken>,
) -> Result<HarmonizedPanel> {
    let target_layer = panel.require(target_time)?;
    let target = target_layer.geometry();

    for layer in panel.layers() {
        request.validate(layer, target, raster)?;
    }

    let mut layers = Vec::with_capacity(panel.len());
    let mut diagnostics = BTreeMap::new();

    for layer in panel.layers() {
        CancelToken::check(cancel)?;

        if layer.time() == target_time {
            let data = AttributeTable::from_columns(
                target.len(),
                request.variables.iter()
                    .map(|spec| (spec.name.as_str(), layer.data().column(&spec.name).unwrap_or_default())),
            )?;
            layers.push(PanelLayer::new(target_time, target.clone(), data)?);
            continue;
        }

        let harmonized = harmonize(layer, target, layer.time(), request, raster, cancel)?;
        diagnostics.insert(layer.time(), harmonized.diagnostics);
        layers.push(harmonized.layer);
    }

    tracing::info!(
        target_time,
        layers = layers.len(),
        method = ?request.method,
        "harmonized panel onto constant boundaries"
    );

    Ok(HarmonizedPanel { panel: Panel::from_layers(layers), diagnostics })
}
